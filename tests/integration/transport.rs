use simlink::{
    sandbox::ArenaSim,
    server::{BridgeConfig, StateFlag, TrainerClient, TransportError},
    systems::Orchestrator,
};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};
use tempfile::TempDir;

use crate::common::{assert_fresh_episode, hold_right, run_frame};

#[test]
fn test_client_drives_host_across_threads() {
    let dir = TempDir::new().unwrap();
    let mut client = TrainerClient::connect_in(dir.path(), 3)
        .unwrap()
        .with_timeout(Duration::from_secs(10));

    let stop = Arc::new(AtomicBool::new(false));
    let host = {
        let stop = stop.clone();
        let path = dir.path().to_path_buf();
        thread::spawn(move || {
            let config = BridgeConfig {
                instance_id: 3,
                ..Default::default()
            };
            let mut sim = ArenaSim::arena();
            let mut bridge = Orchestrator::open_in(config, &path).unwrap();
            while !stop.load(Ordering::Relaxed) {
                run_frame(&mut sim, &mut bridge);
                thread::sleep(Duration::from_millis(1));
            }
        })
    };

    let ready = client.wait_for_state(StateFlag::Ready).unwrap();
    assert_eq!(ready.agent_health, ready.agent_max_health);

    let obs = client.reset().unwrap();
    assert_fresh_episode(&obs);

    let mut previous = obs;
    for _ in 0..3 {
        let obs = client.step(hold_right()).unwrap();
        assert!(obs.episode_time > previous.episode_time);
        assert!(obs.agent_pos_x > previous.agent_pos_x);
        previous = obs;
    }
    assert!(!client.command_pending().unwrap());

    stop.store(true, Ordering::Relaxed);
    host.join().unwrap();
}

#[test]
fn test_undersized_region_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(simlink::server::memory_name(0));
    std::fs::write(&path, [0u8; 64]).unwrap();

    let result = TrainerClient::connect_in(dir.path(), 0);
    assert!(matches!(
        result,
        Err(TransportError::Layout {
            actual: 64,
            expected: 4096
        })
    ));
}
