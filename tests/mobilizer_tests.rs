use approx::assert_relative_eq;
use phys_multibody::math::{Transform, Vec2, Vec3};
use phys_multibody::mobilizers::{
    Ball, BendStretch, Custom, Cylinder, Free, FreeLine, Gimbal, Ground, LineOrientation, Pin, Planar, Screw, Slider,
    Translation, Universal, Weld,
};
use phys_multibody::{Body, MatterSubsystem, MobilizedBody, MobilizerType, MotionFlags, MultibodyError};
use std::collections::HashSet;

#[test]
fn test_ground_is_root() {
    let matter = MatterSubsystem::new();
    let ground = matter.ground();

    assert!(ground.is_in_subsystem());
    assert!(ground.mobilized_body_id().is_ground());
    assert_eq!(ground.inboard_mobilized_body_id(), None);
    assert!(Ground::is_instance_of(&ground));
    assert!(ground.body().is_ground());
    assert_eq!(ground.nq(), 0);
}

#[test]
fn test_every_kind_attaches_with_unique_id() {
    let mut matter = MatterSubsystem::new();
    let ground = matter.ground();

    let children = vec![
        Weld::attach(&mut matter, &ground, Body::default()),
        Pin::attach(&mut matter, &ground, Body::default()),
        Slider::attach(&mut matter, &ground, Body::default()),
        Screw::attach(&mut matter, &ground, Body::default(), 0.1),
        Universal::attach(&mut matter, &ground, Body::default()),
        Cylinder::attach(&mut matter, &ground, Body::default()),
        BendStretch::attach(&mut matter, &ground, Body::default()),
        LineOrientation::attach(&mut matter, &ground, Body::default()),
        Planar::attach(&mut matter, &ground, Body::default()),
        Gimbal::attach(&mut matter, &ground, Body::default()),
        Ball::attach(&mut matter, &ground, Body::default()),
        Translation::attach(&mut matter, &ground, Body::default()),
        FreeLine::attach(&mut matter, &ground, Body::default()),
        Free::attach(&mut matter, &ground, Body::default()),
        Custom::attach(&mut matter, &ground, Body::default(), 2, 3),
    ];

    let mut ids = HashSet::new();
    ids.insert(ground.mobilized_body_id());
    for child in &children {
        assert!(child.is_in_subsystem());
        assert!(!child.is_owner_handle());
        assert!(child.is_in_same_subsystem(&ground));
        assert_eq!(child.inboard_mobilized_body_id(), Some(ground.mobilized_body_id()));
        assert!(ids.insert(child.mobilized_body_id()), "duplicate id for {}", child.kind_type());
    }
    assert_eq!(matter.num_mobilized_bodies(), children.len() + 1);
    assert_eq!(matter.children(ground.mobilized_body_id()).len(), children.len());
}

#[test]
fn test_coordinate_counts() {
    let expected = [
        (Weld::new(), 0),
        (Pin::new(), 1),
        (Slider::new(), 1),
        (Screw::new(0.5), 1),
        (Universal::new(), 2),
        (Cylinder::new(), 2),
        (BendStretch::new(), 2),
        (LineOrientation::new(), 2),
        (Planar::new(), 3),
        (Gimbal::new(), 3),
        (Ball::new(), 3),
        (Translation::new(), 3),
        (FreeLine::new(), 5),
        (Free::new(), 6),
    ];
    for (mobod, n) in &expected {
        assert_eq!(mobod.nq(), *n, "{}", mobod.kind_type());
        assert_eq!(mobod.nu(), *n, "{}", mobod.kind_type());
    }

    let custom = Custom::new(3, 4);
    assert_eq!(custom.nu(), 3);
    assert_eq!(custom.nq(), 4);
    assert_eq!(Custom::downcast(&custom).n_coordinates(), 4);
}

#[test]
fn test_custom_rejects_bad_counts() {
    assert_eq!(
        Custom::try_new(0, 0).err(),
        Some(MultibodyError::InvalidCustomCounts {
            n_mobilities: 0,
            n_coordinates: 0
        })
    );
    assert!(Custom::try_new(4, 3).is_err());
    assert!(Custom::try_new(7, 7).is_err());
    assert!(Custom::try_new(6, 7).is_ok());
}

#[test]
fn test_custom_try_attach() {
    let mut matter = MatterSubsystem::new();
    let ground = matter.ground();

    assert_eq!(
        Custom::try_attach(&mut matter, &ground, Body::default(), 3, 2).err(),
        Some(MultibodyError::InvalidCustomCounts {
            n_mobilities: 3,
            n_coordinates: 2
        })
    );
    assert_eq!(matter.num_mobilized_bodies(), 1);

    let custom = Custom::try_attach(&mut matter, &ground, Body::default(), 2, 3).unwrap();
    assert!(custom.is_in_subsystem());
    assert_eq!(Custom::downcast(&custom).n_mobilities(), 2);
    assert_eq!(Custom::downcast(&custom).n_coordinates(), 3);
    assert_eq!(matter.num_mobilized_bodies(), 2);
}

#[test]
fn test_downcast_narrows_generic_handle() {
    let generic: MobilizedBody = Planar::new();

    assert!(Planar::is_instance_of(&generic));
    assert!(!Pin::is_instance_of(&generic));
    assert_eq!(generic.kind_type(), MobilizerType::Planar);

    let planar = Planar::downcast(&generic);
    assert_eq!(planar.default_q(), Vec3::zeros());
}

#[test]
#[should_panic(expected = "downcast to Pin but the handle holds Planar")]
fn test_downcast_to_wrong_kind_panics() {
    let generic = Planar::new();
    Pin::downcast(&generic);
}

#[test]
fn test_try_downcast_reports_kinds() {
    let generic = Ball::new();
    assert_eq!(
        Slider::try_downcast(&generic).err(),
        Some(MultibodyError::WrongKind {
            expected: "Slider",
            actual: "Ball"
        })
    );
}

#[test]
fn test_upd_downcast_sets_typed_defaults() {
    let mut generic = Universal::new();
    Universal::upd_downcast(&mut generic).set_default_q(Vec2::new(0.1, -0.2));
    assert_eq!(Universal::downcast(&generic).default_q(), Vec2::new(0.1, -0.2));

    let mut pin = Pin::new();
    Pin::upd_downcast(&mut pin).set_default_q(0.75);
    assert_eq!(Pin::downcast(&pin).default_q(), 0.75);
}

#[test]
fn test_screw_pitch() {
    let mut screw = Screw::new(0.2);
    assert_eq!(Screw::downcast(&screw).default_pitch(), 0.2);

    Screw::upd_downcast(&mut screw).set_default_pitch(0.4);
    assert_eq!(Screw::downcast(&screw).default_pitch(), 0.4);

    screw.set_default_q(&[2.0]);
    let x_fm = screw.default_mobilizer_transform();
    assert_relative_eq!(x_fm.translation.vector.z, 0.8, epsilon = 1.0e-12);
}

#[test]
fn test_free_setters_work_before_adoption() {
    let mut pin = Pin::new();
    let inboard = Transform::translation(1.0, 0.0, 0.0);
    let outboard = Transform::translation(0.0, -1.0, 0.0);

    pin.set_default_inboard_frame(inboard).set_default_outboard_frame(outboard);

    assert_eq!(pin.default_inboard_frame(), inboard);
    assert_eq!(pin.default_outboard_frame(), outboard);
}

#[test]
fn test_attach_with_frames_records_frames() {
    let mut matter = MatterSubsystem::new();
    let ground = matter.ground();
    let inboard = Transform::translation(0.0, 2.0, 0.0);
    let outboard = Transform::translation(0.0, 0.5, 0.0);

    let slider = Slider::attach_with_frames(&mut matter, &ground, inboard, Body::default(), outboard);

    assert_eq!(slider.default_inboard_frame(), inboard);
    assert_eq!(slider.default_outboard_frame(), outboard);
}

#[test]
fn test_adopted_setters_must_go_through_subsystem() {
    let mut matter = MatterSubsystem::new();
    let ground = matter.ground();
    let mut pin = Pin::attach(&mut matter, &ground, Body::default());

    assert_eq!(
        pin.try_set_default_outboard_frame(Transform::identity()).err(),
        Some(MultibodyError::AdoptedEdit {
            operation: "set_default_outboard_frame"
        })
    );
    let message = pin.try_set_body(Body::default()).unwrap_err().to_string();
    assert!(message.contains("edit_mobilized_body"));
    assert!(message.contains("invalidates the topology cache"));

    matter.realize_topology();
    matter
        .edit_mobilized_body(pin.mobilized_body_id())
        .set_body(Body::default());
    assert!(!matter.is_topology_cache_valid());
}

#[test]
#[should_panic(expected = "not part of a subsystem")]
fn test_attach_to_free_parent_panics() {
    let mut matter = MatterSubsystem::new();
    let free_parent = Pin::new();
    Pin::attach(&mut matter, &free_parent, Body::default());
}

#[test]
#[should_panic(expected = "handle belongs to subsystem")]
fn test_attach_to_parent_of_other_subsystem_panics() {
    let mut matter = MatterSubsystem::new();
    let other = MatterSubsystem::new();
    let foreign_ground = other.ground();
    Pin::attach(&mut matter, &foreign_ground, Body::default());
}

#[test]
fn test_motion_flags() {
    assert_eq!(Pin::new().motion(), MotionFlags::ROTATION);
    assert_eq!(Translation::new().motion(), MotionFlags::TRANSLATION);
    assert!(Weld::new().motion().is_empty());
    assert_eq!(Cylinder::new().motion(), MotionFlags::ROTATION | MotionFlags::TRANSLATION);
}

#[test]
fn test_q_round_trip_through_typed_views() {
    let mut matter = MatterSubsystem::new();
    let ground = matter.ground();
    let pin = Pin::attach(&mut matter, &ground, Body::default());
    let planar = Planar::attach(&mut matter, &pin, Body::default());
    let free = Free::attach(&mut matter, &planar, Body::default());

    let mut state = matter.default_state();

    *Pin::downcast(&pin).upd_q(&matter, &mut state) = 0.3;
    *Planar::downcast(&planar).upd_q(&matter, &mut state) = [1.0, 2.0, 0.5];
    Free::downcast(&free).upd_q(&matter, &mut state)[5] = -4.0;

    assert_eq!(Pin::downcast(&pin).q(&matter, &state), 0.3);
    assert_eq!(Planar::downcast(&planar).q(&matter, &state), Vec3::new(1.0, 2.0, 0.5));
    assert_eq!(Free::downcast(&free).q(&matter, &state)[5], -4.0);

    let (start, count) = matter.find_mobilizer_qs(&state, planar.mobilized_body_id());
    assert_eq!(planar.q_index(&matter, &state), start);
    assert_eq!(count, 3);
    assert_eq!(&state.q().as_slice()[start..start + count], &[1.0, 2.0, 0.5]);
}

#[test]
fn test_u_and_mobility_forces_round_trip() {
    let mut matter = MatterSubsystem::new();
    let ground = matter.ground();
    let slider = Slider::attach(&mut matter, &ground, Body::default());
    let ball = Ball::attach(&mut matter, &slider, Body::default());

    let mut state = matter.default_state();

    *Slider::downcast(&slider).upd_u(&matter, &mut state) = 1.5;
    *Slider::downcast(&slider).upd_mobility_force(&matter, &mut state) = -2.0;
    Ball::downcast(&ball).upd_u(&matter, &mut state)[1] = 3.0;
    Ball::downcast(&ball).upd_mobility_forces(&matter, &mut state)[2] = 9.0;

    assert_eq!(Slider::downcast(&slider).u(&matter, &state), 1.5);
    assert_eq!(Slider::downcast(&slider).mobility_force(&matter, &state), -2.0);
    assert_eq!(Ball::downcast(&ball).u(&matter, &state), Vec3::new(0.0, 3.0, 0.0));
    assert_eq!(Ball::downcast(&ball).mobility_forces(&matter, &state), Vec3::new(0.0, 0.0, 9.0));
    assert_eq!(ball.u_index(&matter, &state), 1);

    state.clear_mobility_forces();
    assert_eq!(ball.mobility_forces(&matter, &state), &[0.0, 0.0, 0.0]);
}

#[test]
fn test_default_state_holds_default_q() {
    let mut matter = MatterSubsystem::new();
    let ground = matter.ground();

    let mut gimbal = Gimbal::new();
    Gimbal::upd_downcast(&mut gimbal).set_default_q(Vec3::new(0.1, 0.2, 0.3));
    matter.adopt_mobilized_body(ground.mobilized_body_id(), &mut gimbal);

    let state = matter.default_state();
    assert_eq!(Gimbal::downcast(&gimbal).q(&matter, &state), Vec3::new(0.1, 0.2, 0.3));
    assert!(state.u().iter().all(|&u| u == 0.0));
}

#[test]
fn test_mobilizer_transform_follows_state() {
    let mut matter = MatterSubsystem::new();
    let ground = matter.ground();
    let slider = Slider::attach(&mut matter, &ground, Body::default());

    let mut state = matter.default_state();
    *Slider::downcast(&slider).upd_q(&matter, &mut state) = 2.5;

    let x_fm = slider.mobilizer_transform(&matter, &state);
    assert_relative_eq!(x_fm.translation.vector, Vec3::new(2.5, 0.0, 0.0), epsilon = 1.0e-12);
}
