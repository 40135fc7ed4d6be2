use phys_multibody::math::{Transform, Vec3};
use phys_multibody::mobilizers::{Ball, Custom, Free, Pin, Planar, Screw, Slider, Universal};
use phys_multibody::{Body, MatterSubsystem, MobilizedBody, MobilizedBodyId, MultibodyError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[test]
fn test_pin_ball_chain_offsets() {
    let mut matter = MatterSubsystem::new();
    let ground = matter.ground();
    let p1 = Pin::attach(&mut matter, &ground, Body::default());
    let p2 = Ball::attach(&mut matter, &p1, Body::default());

    let topology = matter.realize_topology();
    assert_eq!(topology.nq(), 4);
    assert_eq!(topology.nu(), 4);

    let state = matter.default_state();
    assert_eq!(state.nq(), 4);
    assert_eq!(matter.find_mobilizer_qs(&state, p1.mobilized_body_id()), (0, 1));
    assert_eq!(matter.find_mobilizer_qs(&state, p2.mobilized_body_id()), (1, 3));
    assert_eq!(p2.q_index(&matter, &state), 1);
    assert_eq!(p2.inboard_mobilized_body_id(), Some(p1.mobilized_body_id()));
}

#[test]
fn test_adoption_invalidates_topology() {
    let mut matter = MatterSubsystem::new();
    let ground = matter.ground();
    Pin::attach(&mut matter, &ground, Body::default());

    matter.realize_topology();
    assert!(matter.is_topology_cache_valid());

    Slider::attach(&mut matter, &ground, Body::default());
    assert!(!matter.is_topology_cache_valid());
}

#[test]
fn test_outboard_frame_edit_invalidates_topology() {
    let mut matter = MatterSubsystem::new();
    let ground = matter.ground();
    let pin = Pin::attach(&mut matter, &ground, Body::default());

    matter.realize_topology();
    assert!(matter.is_topology_cache_valid());

    let frame = Transform::translation(0.0, 0.0, 1.0);
    matter
        .edit_mobilized_body(pin.mobilized_body_id())
        .set_default_outboard_frame(frame);

    assert!(!matter.is_topology_cache_valid());
    assert_eq!(pin.default_outboard_frame(), frame);
}

#[test]
fn test_structural_edits() {
    let mut matter = MatterSubsystem::new();
    let ground = matter.ground();
    let screw = Screw::attach(&mut matter, &ground, Body::default(), 0.1);
    let id = screw.mobilized_body_id();

    matter
        .edit_mobilized_body(id)
        .set_default_inboard_frame(Transform::translation(1.0, 0.0, 0.0))
        .set_default_q(&[0.5])
        .set_default_pitch(0.3)
        .set_body(Body::default());

    assert_eq!(Screw::downcast(&screw).default_q(), 0.5);
    assert_eq!(Screw::downcast(&screw).default_pitch(), 0.3);

    let mut edit = matter.edit_mobilized_body(id);
    assert_eq!(edit.mobilized_body_id(), id);
    assert_eq!(
        edit.try_set_default_q(&[1.0, 2.0]),
        Err(MultibodyError::CoordinateCount { expected: 1, got: 2 })
    );
}

#[test]
fn test_ground_cannot_be_edited_or_attached() {
    let mut matter = MatterSubsystem::new();
    assert!(matches!(
        matter.try_edit_mobilized_body(MobilizedBodyId::GROUND),
        Err(MultibodyError::Ground(_))
    ));

    let mut stray_ground = MobilizedBody::new(phys_multibody::MobilizerKind::Ground);
    assert!(matches!(
        matter.try_adopt_mobilized_body(MobilizedBodyId::GROUND, &mut stray_ground),
        Err(MultibodyError::Ground(_))
    ));
}

#[test]
fn test_adopting_twice_fails() {
    let mut matter = MatterSubsystem::new();
    let ground = matter.ground();
    let mut pin = Pin::attach(&mut matter, &ground, Body::default());

    assert_eq!(
        matter.try_adopt_mobilized_body(ground.mobilized_body_id(), &mut pin),
        Err(MultibodyError::AlreadyAdopted {
            entity: "MobilizedBody"
        })
    );
}

#[test]
fn test_lookup_requires_realized_topology() {
    let mut matter = MatterSubsystem::new();
    let ground = matter.ground();
    let pin = Pin::attach(&mut matter, &ground, Body::default());
    let state = matter.default_state();

    Slider::attach(&mut matter, &ground, Body::default());
    assert_eq!(
        matter.try_find_mobilizer_qs(&state, pin.mobilized_body_id()),
        Err(MultibodyError::TopologyNotRealized(matter.id()))
    );

    matter.realize_topology();
    assert!(matches!(
        matter.try_find_mobilizer_qs(&state, pin.mobilized_body_id()),
        Err(MultibodyError::StaleState { .. })
    ));
}

#[test]
#[should_panic(expected = "is not realized")]
fn test_state_access_after_adoption_panics() {
    let mut matter = MatterSubsystem::new();
    let ground = matter.ground();
    let pin = Pin::attach(&mut matter, &ground, Body::default());
    let state = matter.default_state();

    Slider::attach(&mut matter, &ground, Body::default());
    pin.q(&matter, &state);
}

#[test]
fn test_state_from_other_subsystem_is_rejected() {
    let mut matter1 = MatterSubsystem::new();
    let mut matter2 = MatterSubsystem::new();
    matter1.realize_topology();
    let state = matter2.default_state();

    assert!(matches!(
        matter1.try_find_mobilizer_qs(&state, MobilizedBodyId::GROUND),
        Err(MultibodyError::ForeignSubsystem { .. })
    ));
    assert!(!matter1.is_same_subsystem(&matter2));
}

#[test]
fn test_whole_state_arrays() {
    let mut matter = MatterSubsystem::new();
    let ground = matter.ground();
    let planar = Planar::attach(&mut matter, &ground, Body::default());
    let mut state = matter.default_state();

    matter.upd_q(&mut state)[2] = 0.7;
    matter.upd_u(&mut state).fill(1.0);
    matter.upd_mobility_forces(&mut state)[0] = -1.0;

    assert_eq!(Planar::downcast(&planar).q(&matter, &state), Vec3::new(0.0, 0.0, 0.7));
    assert_eq!(matter.get_q(&state).len(), 3);
    assert!(matter.get_u(&state).iter().all(|&u| u == 1.0));
    assert_eq!(matter.get_mobility_forces(&state)[0], -1.0);
}

#[test]
fn test_state_arrays_are_fixed_length_slices() {
    let mut matter = MatterSubsystem::new();
    let ground = matter.ground();
    let planar = Planar::attach(&mut matter, &ground, Body::default());
    let mut state = matter.default_state();

    let q = matter.upd_q(&mut state);
    assert_eq!(q.len(), 3);
    q.copy_from_slice(&[1.0, 2.0, 3.0]);
    state.upd_u().fill(-2.0);

    assert_eq!(state.nq(), 3);
    assert_eq!(state.nu(), 3);
    assert_eq!(Planar::downcast(&planar).q(&matter, &state), Vec3::new(1.0, 2.0, 3.0));
    assert_eq!(
        planar.try_u(&matter, &state),
        Ok(&[-2.0, -2.0, -2.0][..])
    );
}

#[test]
fn test_tree_navigation() {
    let mut matter = MatterSubsystem::new();
    let ground = matter.ground();
    let a = Pin::attach(&mut matter, &ground, Body::default());
    let b = Universal::attach(&mut matter, &a, Body::default());
    let c = Slider::attach(&mut matter, &a, Body::default());

    assert_eq!(
        matter.children(a.mobilized_body_id()),
        vec![b.mobilized_body_id(), c.mobilized_body_id()]
    );
    assert!(matter
        .inboard_mobilized_body(c.mobilized_body_id())
        .map_or(false, |parent| parent.same_record(&a)));
    assert!(matter.inboard_mobilized_body(MobilizedBodyId::GROUND).is_none());

    let topology = matter.realize_topology();
    assert_eq!(topology.level(b.mobilized_body_id()), Some(2));
    assert_eq!(topology.children(MobilizedBodyId::GROUND), &[a.mobilized_body_id()]);
}

fn attach_random(rng: &mut StdRng, matter: &mut MatterSubsystem, parent: &MobilizedBody) -> MobilizedBody {
    match rng.gen_range(0..5) {
        0 => Pin::attach(matter, parent, Body::default()),
        1 => Ball::attach(matter, parent, Body::default()),
        2 => Free::attach(matter, parent, Body::default()),
        3 => Universal::attach(matter, parent, Body::default()),
        _ => {
            let nu = rng.gen_range(1..=6);
            let nq = rng.gen_range(nu..=7);
            Custom::attach(matter, parent, Body::default(), nu, nq)
        }
    }
}

#[test]
fn test_random_trees_index_contiguously() {
    let mut rng = StdRng::seed_from_u64(0x5eed);

    for _ in 0..20 {
        let mut matter = MatterSubsystem::new();
        let mut bodies = vec![matter.ground()];

        for _ in 0..rng.gen_range(1..30) {
            let parent = bodies[rng.gen_range(0..bodies.len())].clone();
            let child = attach_random(&mut rng, &mut matter, &parent);
            bodies.push(child);
        }

        let mut state = matter.default_state();

        // Coordinate blocks tile the q and u arrays in id order
        let mut next_q = 0;
        let mut next_u = 0;
        for mobod in &bodies {
            let id = mobod.mobilized_body_id();
            let (q_start, nq) = matter.find_mobilizer_qs(&state, id);
            let (u_start, nu) = matter.find_mobilizer_us(&state, id);
            assert_eq!((q_start, nq), (next_q, mobod.nq()));
            assert_eq!((u_start, nu), (next_u, mobod.nu()));
            next_q += nq;
            next_u += nu;
        }
        assert_eq!(next_q, state.nq());
        assert_eq!(next_u, state.nu());

        // Writes through one mobilizer never leak into another's block
        for (i, mobod) in bodies.iter().enumerate() {
            mobod.upd_q(&matter, &mut state).fill(i as f64);
        }
        for (i, mobod) in bodies.iter().enumerate() {
            assert!(mobod.q(&matter, &state).iter().all(|&q| q == i as f64));
        }
    }
}
