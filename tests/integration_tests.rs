//! Integration tests for motor-hal.
//!
//! These tests drive the adapters through the capability traits only, the way
//! mechanism code does, and observe the wire through simulated transports.

use std::io;
use std::sync::{Arc, Mutex};

use motor_hal::config::parse_config;
use motor_hal::controller::{ErrorCode, RevStatus, SparkMode, TalonMode};
use motor_hal::transport::sim::{SimBus, SimCtre, SimRev};
use motor_hal::transport::{Demand, Request, Signal};
use motor_hal::{
    CanSpeedController, ConfigError, ControlMode, ControllerError, DeviceFamily, Error,
    MotorProvider, SparkMax, TalonFx,
};
use proptest::prelude::*;
use tracing_subscriber::fmt::MakeWriter;

// =============================================================================
// Helpers
// =============================================================================

const ROBOT_CONFIG: &str = r#"
timeout_ms = 20

[motors."exampleMechanism.leftMotor"]
family = "talon_fx"
device_id = 1
neutral_mode = "brake"

[motors."exampleMechanism.rightMotor"]
family = "talon_fx"
device_id = 2
inverted = true
neutral_mode = "brake"

[motors."intake.roller"]
family = "spark_max"
device_id = 1
open_loop_ramp = 0.2
"#;

fn talon(id: u8) -> (TalonFx<SimCtre>, SimCtre) {
    let sim = SimCtre::new();
    (TalonFx::new(id, sim.clone()), sim)
}

fn spark(id: u8) -> (SparkMax<SimRev>, SimRev) {
    let sim = SimRev::new();
    (SparkMax::new(id, sim.clone()), sim)
}

/// Mechanism that owns two motors, as caller code would.
struct ExampleMechanism {
    left: Box<dyn CanSpeedController>,
    right: Box<dyn CanSpeedController>,
}

impl ExampleMechanism {
    fn new(provider: &mut MotorProvider<SimBus>) -> motor_hal::Result<Self> {
        Ok(Self {
            left: provider.can_motor("exampleMechanism.leftMotor")?,
            right: provider.can_motor("exampleMechanism.rightMotor")?,
        })
    }

    fn set_motor_power(&mut self, left: f64, right: f64) -> motor_hal::Result<()> {
        self.left.set(left)?;
        self.right.set(right)
    }
}

/// Collects formatted log output.
#[derive(Clone, Default)]
struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

// =============================================================================
// Provisioning workflow
// =============================================================================

#[test]
fn mechanism_commands_reach_both_devices() {
    let config = parse_config(ROBOT_CONFIG).expect("config should parse");
    let mut provider = MotorProvider::new(config, SimBus::new()).unwrap();
    let mut mechanism = ExampleMechanism::new(&mut provider).unwrap();

    mechanism.set_motor_power(0.5, -0.25).unwrap();

    let left = provider.bus().ctre(1).unwrap();
    let right = provider.bus().ctre(2).unwrap();
    assert_eq!(
        left.last_request(),
        Some(Request::Set(Demand {
            mode: TalonMode::PercentOutput,
            value: 0.5,
            feed_forward: None,
        }))
    );
    assert_eq!(
        right.last_request(),
        Some(Request::Set(Demand {
            mode: TalonMode::PercentOutput,
            value: -0.25,
            feed_forward: None,
        }))
    );
    assert!(mechanism.right.inverted());
}

#[test]
fn same_can_id_in_two_families_opens_two_devices() {
    let config = parse_config(ROBOT_CONFIG).unwrap();
    let mut provider = MotorProvider::new(config, SimBus::new()).unwrap();

    let talon = provider.can_motor("exampleMechanism.leftMotor").unwrap();
    let roller = provider.can_motor("intake.roller").unwrap();

    assert_eq!(talon.device().family, DeviceFamily::Ctre);
    assert_eq!(roller.device().family, DeviceFamily::Rev);
    assert_eq!(
        provider.bus().rev(1).unwrap().requests(),
        vec![
            Request::SetInverted(false),
            Request::ConfigOpenLoopRamp(0.2),
        ]
    );
}

#[test]
fn rejected_configuration_is_not_claimed() {
    let mut bus = SimBus::new();
    let sim = bus_ctre(&mut bus, 1);
    sim.push_status(ErrorCode::RX_TIMEOUT);

    let config = parse_config(ROBOT_CONFIG).unwrap();
    let mut provider = MotorProvider::new(config, bus).unwrap();

    let err = provider
        .can_motor("exampleMechanism.leftMotor")
        .err()
        .expect("inversion should be rejected");
    assert_eq!(err.diagnostic(), Some("RxTimeout"));
    assert!(!provider.is_claimed("exampleMechanism.leftMotor"));

    assert!(provider.can_motor("exampleMechanism.leftMotor").is_ok());
}

fn bus_ctre(bus: &mut SimBus, id: u8) -> SimCtre {
    use motor_hal::DeviceBus;
    bus.open_ctre(id).unwrap()
}

// =============================================================================
// Mode translation
// =============================================================================

#[test]
fn mapped_modes_read_back_as_same_category() {
    for mode in ControlMode::ALL {
        let (mut motor, _) = talon(1);
        motor.set_control(mode, 1.0).unwrap();
        assert_eq!(motor.control_mode(), Some(mode), "talon {mode}");
    }

    for mode in [
        ControlMode::PercentOutput,
        ControlMode::Position,
        ControlMode::Velocity,
        ControlMode::Current,
        ControlMode::MotionMagic,
        ControlMode::Disabled,
    ] {
        let (mut motor, _) = spark(1);
        motor.set_control(mode, 1.0).unwrap();
        assert_eq!(motor.control_mode(), Some(mode), "spark {mode}");
    }
}

#[test]
fn velocity_setpoint_is_normalized_per_family() {
    let (mut ctre, ctre_sim) = talon(1);
    let (mut rev, rev_sim) = spark(1);

    ctre.set_control(ControlMode::Velocity, 100.0).unwrap();
    rev.set_control(ControlMode::Velocity, 100.0).unwrap();

    assert!(matches!(
        ctre_sim.last_request(),
        Some(Request::Set(Demand { mode: TalonMode::Velocity, value, .. })) if (value - 10.0).abs() < 1e-12
    ));
    assert!(matches!(
        rev_sim.last_request(),
        Some(Request::Set(Demand { mode: SparkMode::Velocity, value, .. })) if (value - 6000.0).abs() < 1e-9
    ));
}

#[test]
fn position_is_not_scaled() {
    let (mut motor, sim) = talon(1);
    motor.set_control(ControlMode::Position, -4096.5).unwrap();
    assert!(matches!(
        sim.last_request(),
        Some(Request::Set(Demand { value, .. })) if value == -4096.5
    ));
}

proptest! {
    #[test]
    fn ctre_velocity_round_trip(v in -50_000.0f64..50_000.0) {
        let (mut motor, sim) = talon(1);
        motor.set_control(ControlMode::Velocity, v).unwrap();

        let Some(Request::Set(demand)) = sim.last_request() else {
            panic!("expected a set request");
        };
        sim.set_signal(Signal::Velocity, demand.value);

        let back = motor.sensor_velocity();
        prop_assert!((back - v).abs() <= 1e-9 * v.abs().max(1.0));
    }

    #[test]
    fn rev_velocity_round_trip(v in -50_000.0f64..50_000.0) {
        let (mut motor, sim) = spark(1);
        motor.set_control(ControlMode::Velocity, v).unwrap();

        let Some(Request::Set(demand)) = sim.last_request() else {
            panic!("expected a set request");
        };
        sim.set_signal(Signal::Velocity, demand.value);

        let back = motor.sensor_velocity();
        prop_assert!((back - v).abs() <= 1e-9 * v.abs().max(1.0));
    }
}

// =============================================================================
// Feed-forward composition
// =============================================================================

#[test]
fn feed_forward_only_rides_closed_loop_commands() {
    let (mut motor, sim) = talon(1);
    motor.set_arbitrary_feed_forward(0.07);

    motor.set_control(ControlMode::Position, 2048.0).unwrap();
    assert_eq!(
        sim.last_request(),
        Some(Request::Set(Demand {
            mode: TalonMode::Position,
            value: 2048.0,
            feed_forward: Some(0.07),
        }))
    );

    motor.set_control(ControlMode::PercentOutput, 0.3).unwrap();
    assert_eq!(
        sim.last_request(),
        Some(Request::Set(Demand {
            mode: TalonMode::PercentOutput,
            value: 0.3,
            feed_forward: None,
        }))
    );

    // Mode switches keep the stored term.
    motor.set_control(ControlMode::MotionMagic, 10.0).unwrap();
    assert!(matches!(
        sim.last_request(),
        Some(Request::Set(Demand { feed_forward: Some(ff), .. })) if ff == 0.07
    ));
}

#[test]
fn feed_forward_persists_until_overwritten() {
    let (mut motor, sim) = spark(3);
    motor.set_arbitrary_feed_forward(0.5);
    motor.set_control(ControlMode::Current, 4.0).unwrap();
    motor.set_arbitrary_feed_forward(-0.1);
    motor.set_control(ControlMode::Current, 4.0).unwrap();

    let feed_forwards: Vec<_> = sim
        .requests()
        .into_iter()
        .filter_map(|r| match r {
            Request::Set(d) => d.feed_forward,
            _ => None,
        })
        .collect();
    assert_eq!(feed_forwards, vec![0.5, -0.1]);
}

// =============================================================================
// Untranslatable modes
// =============================================================================

#[test]
fn untranslatable_mode_is_logged_and_disables_output() {
    let (mut motor, sim) = spark(5);
    motor.set_arbitrary_feed_forward(0.2);

    let capture = LogCapture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(capture.clone())
        .with_ansi(false)
        .finish();
    tracing::subscriber::with_default(subscriber, || {
        motor.set_control(ControlMode::MotionProfileArc, 750.0).unwrap();
    });

    let logs = capture.contents();
    assert!(logs.contains("ERROR"), "logs: {logs}");
    assert!(logs.contains("not translatable"), "logs: {logs}");
    assert!(logs.contains("MotionProfileArc"), "logs: {logs}");

    assert_eq!(
        sim.last_request(),
        Some(Request::Set(Demand {
            mode: SparkMode::Disabled,
            value: 0.0,
            feed_forward: None,
        }))
    );
}

#[test]
fn follower_set_mode_on_rev_disables_output() {
    let (mut motor, sim) = spark(5);
    motor.set_control(ControlMode::Follower, 3.0).unwrap();
    assert!(matches!(
        sim.last_request(),
        Some(Request::Set(Demand { mode: SparkMode::Disabled, value, .. })) if value == 0.0
    ));
}

// =============================================================================
// Following
// =============================================================================

#[test]
fn incompatible_leader_is_rejected_before_any_transport_call() {
    let (rev_leader, rev_sim) = spark(4);
    let (mut follower, sim) = talon(6);

    let err = follower.follow(&rev_leader).unwrap_err();
    assert_eq!(
        err,
        Error::Controller(ControllerError::IncompatibleFollower {
            follower: DeviceFamily::Ctre,
            leader: DeviceFamily::Rev,
        })
    );
    assert!(!err.is_command_failed());
    assert_eq!(sim.request_count(), 0);
    assert_eq!(rev_sim.request_count(), 0);

    let (ctre_leader, _) = talon(7);
    let (mut rev_follower, rev_follower_sim) = spark(8);
    assert!(rev_follower.follow(&ctre_leader).is_err());
    assert_eq!(rev_follower_sim.request_count(), 0);
}

#[test]
fn boxed_controllers_follow_within_family() {
    let config = parse_config(ROBOT_CONFIG).unwrap();
    let mut provider = MotorProvider::new(config, SimBus::new()).unwrap();
    let leader = provider.can_motor("exampleMechanism.leftMotor").unwrap();
    let mut follower = provider.can_motor("exampleMechanism.rightMotor").unwrap();

    follower.follow(leader.as_ref()).unwrap();
    assert_eq!(follower.control_mode(), Some(ControlMode::Follower));
    assert_eq!(
        provider.bus().ctre(2).unwrap().last_request(),
        Some(Request::Set(Demand {
            mode: TalonMode::Follower,
            value: 1.0,
            feed_forward: None,
        }))
    );
}

// =============================================================================
// Error-code translation
// =============================================================================

type Call = fn(&mut dyn CanSpeedController) -> motor_hal::Result<()>;

const CONFIG_CALLS: [(&str, Call); 13] = [
    ("set_p", |m| m.set_p(0.1)),
    ("set_i", |m| m.set_i(0.001)),
    ("set_d", |m| m.set_d(1.5)),
    ("set_ff", |m| m.set_ff(0.04)),
    ("set_open_loop_ramp", |m| m.set_open_loop_ramp(0.3)),
    ("set_closed_loop_ramp", |m| m.set_closed_loop_ramp(0.1)),
    ("set_position", |m| m.set_position(0.0)),
    ("set_selected_feedback_sensor", |m| {
        m.set_selected_feedback_sensor(motor_hal::FeedbackSensor::IntegratedSensor)
    }),
    ("set_sensor_inverted", |m| m.set_sensor_inverted(true)),
    ("set_output_range", |m| m.set_output_range(-0.5, 0.5)),
    ("restore_factory_default", |m| m.restore_factory_default()),
    ("set_inverted", |m| m.set_inverted(true)),
    ("set_neutral_mode", |m| m.set_neutral_mode(motor_hal::NeutralMode::Coast)),
];

#[test]
fn ctre_config_calls_translate_status() {
    for (name, call) in CONFIG_CALLS {
        let (mut motor, sim) = talon(1);
        assert!(call(&mut motor).is_ok(), "{name} should succeed");

        sim.push_status(ErrorCode::SENSOR_NOT_PRESENT);
        let err = call(&mut motor).expect_err(name);
        assert!(err.is_command_failed(), "{name}");
        assert_eq!(err.diagnostic(), Some("SensorNotPresent"), "{name}");
    }
}

#[test]
fn rev_config_calls_translate_status() {
    for (name, call) in CONFIG_CALLS {
        let (mut motor, sim) = spark(1);
        assert!(call(&mut motor).is_ok(), "{name} should succeed");

        sim.push_status(RevStatus::CanDisconnected);
        let err = call(&mut motor).expect_err(name);
        assert_eq!(err.diagnostic(), Some("kCANDisconnected"), "{name}");
    }
}

#[test]
fn set_surfaces_device_rejection() {
    let (mut motor, sim) = talon(1);
    sim.push_status(ErrorCode(-1234));
    let err = motor.set_control(ControlMode::Position, 1.0).unwrap_err();
    assert_eq!(err.diagnostic(), Some("ErrorCode(-1234)"));
    assert_eq!(motor.control_mode(), None);
}

#[test]
fn invalid_config_is_rejected_by_provider() {
    let toml = r#"
[motors.a]
family = "talon_fx"
device_id = 4

[motors.b]
family = "talon_fx"
device_id = 4
"#;
    let err = parse_config(toml).unwrap_err();
    assert!(matches!(
        err,
        Error::Config(ConfigError::DuplicateDevice { family: DeviceFamily::Ctre, device_id: 4 })
    ));
}
