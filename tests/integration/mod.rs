mod handshake;
mod reset;
mod sensor;
mod step;
mod transport;
