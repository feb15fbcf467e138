//! Elbow controller driven by a scripted distance sequence

use face_follow_arm::{
    command::JointCommand,
    config::ControllerConfig,
    controller::{elbow_step, ElbowController},
};

const APPROACH: [f64; 8] = [50.0, 45.0, 40.0, 35.0, 32.0, 30.0, 28.0, 26.0];

#[test]
fn test_approaching_face() {
    let mut controller = ElbowController::new(ControllerConfig::default());
    let angles: Vec<f64> = APPROACH.iter().map(|&d| controller.update(Some(d))).collect();

    // Far away: rate limited retraction
    assert_eq!(&angles[..3], &[87.0, 84.0, 81.0]);

    // 35 cm: ideal 90 - 50 / 6 = 81.67 is within one step
    let ideal_35 = 90.0 - 50.0 / 6.0;
    assert!((angles[3] - ideal_35).abs() < 1e-9);

    // 32, 30 and 28 cm are inside the tolerance band
    assert_eq!(angles[4], angles[3]);
    assert_eq!(angles[5], angles[3]);
    assert_eq!(angles[6], angles[3]);

    // 26 cm: too close, extend by at most 3 degrees
    assert!((angles[7] - (angles[3] + 3.0)).abs() < 1e-9);

    let mut previous = 90.0;
    for angle in &angles {
        assert!((angle - previous).abs() <= 3.0 + 1e-12);
        previous = *angle;
    }
}

#[test]
fn test_setpoint_is_fixed_point() {
    let config = ControllerConfig::default();
    for current in [-45.0, 0.0, 42.5, 90.0, 180.0] {
        assert_eq!(elbow_step(current, Some(config.target_distance_cm), &config), current);
    }
}

#[test]
fn test_commands_follow_controller() {
    let mut controller = ElbowController::new(ControllerConfig::default());
    let commands: Vec<JointCommand> = APPROACH
        .iter()
        .map(|&d| JointCommand::joint_angles(controller.update(Some(d)), 10, 10))
        .collect();

    assert_eq!(commands.len(), APPROACH.len());
    assert!(commands.iter().all(|c| c.base == 0.0 && c.shoulder == 0.0 && c.wrist == 180.0));
    assert_eq!(commands[0].elbow, 87.0);
}

#[test]
fn test_custom_gain_sign() {
    // A positive gain extends when the face is far
    let config = ControllerConfig { gain: 50.0, ..ControllerConfig::default() };
    assert_eq!(elbow_step(90.0, Some(50.0), &config), 93.0);
}
