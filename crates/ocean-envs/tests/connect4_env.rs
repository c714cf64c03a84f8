use ndarray::Array2;
use ocean::env::PufferEnv;
use ocean::vector::Serial;
use ocean_envs::connect4::COLS;
use ocean_envs::{Connect4, Connect4Config};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[test]
fn test_random_play_reports_episodes() {
    let config = Connect4Config::default()
        .with_num_envs(16)
        .with_report_interval(32);
    let mut env = Connect4::new(config).unwrap();
    env.reset(Some(0));

    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut reports = Vec::new();
    for _ in 0..128 {
        let actions = Array2::from_shape_fn((16, 1), |_| rng.gen_range(0..COLS) as f32);
        let result = env.step(&actions).unwrap();
        assert!(result.rewards.iter().all(|r| [-1.0, 0.0, 1.0].contains(r)));
        assert!(result
            .observations
            .iter()
            .all(|v| [0.0, 0.5, 1.0].contains(v)));
        if !result.info.is_empty() {
            reports.push(result.info.clone());
        }
    }

    assert_eq!(reports.len(), 4);
    for info in reports {
        let score = info.get("score").unwrap();
        assert!((0.0..=1.0).contains(&score));
        assert!(info.episode_length.unwrap() >= 1.0);
        assert!(info.get("n").unwrap() >= 1.0);
    }
}

#[test]
fn test_serial_connect4() {
    let mut vec_env = Serial::new(
        || Connect4::new(Connect4Config::default().with_num_envs(2)),
        2,
    )
    .unwrap();
    let (obs, _) = vec_env.reset(Some(0));
    assert_eq!(obs.dim(), (4, 42));

    let result = vec_env.step(&Array2::from_elem((4, 1), 3.0)).unwrap();
    assert_eq!(result.rewards.len(), 4);
    assert!(result.terminals.iter().all(|&t| !t));
}
