use approx::assert_relative_eq;
use nalgebra::{UnitQuaternion, Vector3};
use rigpose_core::{
    catalog::{AttachMode, JointCatalog, JointDescriptor},
    config::SolverConfig,
    rest_pose::RestOverrides,
    source::DescriptorList,
    error::{FrameField, PoseError},
    math::quat_to_xyzw,
    pose::Pose,
    rest_pose::RestPose,
};

fn two_chain() -> RestPose {
    let catalog = JointCatalog::new("two-chain")
        .with_joint(JointDescriptor::new("root", "", 1.0))
        .with_joint(JointDescriptor::new("child", "root", 1.0));
    RestPose::from_catalog(&catalog, SolverConfig::default()).unwrap()
}

fn humanoid() -> RestPose {
    RestPose::from_catalog(&JointCatalog::humanoid(), SolverConfig::default()).unwrap()
}

fn identity_rotations(joints: usize) -> Vec<f64> {
    [0.0, 0.0, 0.0, 1.0].repeat(joints)
}

/// Deterministic spread of rotations, different for every joint and seed.
fn scattered_rotations(joints: usize, seed: f64) -> Vec<f64> {
    (0..joints)
        .flat_map(|i| {
            let t = seed + i as f64;
            let q = UnitQuaternion::from_euler_angles(0.7 * t.sin(), 1.3 * t.cos(), 0.4 * t);
            quat_to_xyzw(&q)
        })
        .collect()
}

fn assert_anchored(pose: &Pose) {
    for bone in pose.bones() {
        let Some(parent) = pose.parent_of(bone) else {
            continue;
        };
        let anchor = match bone.attach {
            AttachMode::Head => parent.head_abs,
            AttachMode::Tail => parent.tail_abs,
        };
        assert_relative_eq!(bone.head_abs, anchor + bone.offset_abs, epsilon = 1e-12);
    }
}

#[test]
fn identity_two_chain_stacks_along_y() {
    let rest = two_chain();
    let pose = rest.apply([0.0; 3], None, &identity_rotations(2), None).unwrap();
    let root = pose.get("root").unwrap();
    let child = pose.get("child").unwrap();
    assert_eq!(root.head_abs, Vector3::new(0.0, 0.0, 0.0));
    assert_eq!(root.tail_abs, Vector3::new(0.0, 1.0, 0.0));
    assert_eq!(child.head_abs, Vector3::new(0.0, 1.0, 0.0));
    assert_eq!(child.tail_abs, Vector3::new(0.0, 2.0, 0.0));
}

#[test]
fn rotated_root_carries_child_along() {
    let rest = two_chain();
    let mut rotations = identity_rotations(2);
    let quarter = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), std::f64::consts::FRAC_PI_2);
    rotations[..4].copy_from_slice(&quat_to_xyzw(&quarter));

    let pose = rest.apply([0.0; 3], None, &rotations, None).unwrap();
    let root = pose.get("root").unwrap();
    let child = pose.get("child").unwrap();
    assert_relative_eq!(root.tail_abs, Vector3::new(-1.0, 0.0, 0.0), epsilon = 1e-12);
    assert_relative_eq!(child.head_abs, root.tail_abs, epsilon = 1e-12);
    assert_relative_eq!(child.tail_abs, Vector3::new(-2.0, 0.0, 0.0), epsilon = 1e-12);
}

#[test]
fn short_rotation_array_is_a_shape_error() {
    let rest = two_chain();
    let before = rest.clone();
    let err = rest.apply([0.0; 3], None, &[0.0, 0.0, 0.0, 1.0], None).unwrap_err();
    assert_eq!(
        err,
        PoseError::FrameShape {
            field: FrameField::Rotation,
            required: 8,
            actual: 4
        }
    );
    assert!(err.is_recoverable());
    assert_eq!(rest, before);
}

#[test]
fn lengths_survive_arbitrary_rotations() {
    let rest = humanoid();
    let n = rest.joint_count();
    for seed in 0..8 {
        let rotations = scattered_rotations(n, seed as f64 * 0.37);
        let pose = rest
            .apply([0.5, 0.9, -1.0], None, &rotations, None)
            .unwrap();
        for (posed, resting) in pose.bones().iter().zip(rest.pose().bones()) {
            assert_relative_eq!(posed.length(), resting.length(), epsilon = 1e-9);
        }
        assert_anchored(&pose);
    }
}

#[test]
fn root_lands_exactly_on_location() {
    let rest = humanoid();
    let location = [1.25, -0.5, 3.0];
    let pose = rest
        .apply(location, None, &identity_rotations(rest.joint_count()), None)
        .unwrap();
    assert_eq!(pose.root_bone().head_abs, Vector3::from(location));
    assert_anchored(&pose);
}

#[test]
fn identity_frame_reproduces_rest_pose() {
    let rest = humanoid();
    let pose = rest
        .apply([0.0; 3], None, &identity_rotations(rest.joint_count()), None)
        .unwrap();
    for (posed, resting) in pose.bones().iter().zip(rest.pose().bones()) {
        assert_eq!(posed.name, resting.name);
        assert_relative_eq!(posed.head_abs, resting.head_abs, epsilon = 1e-12);
        assert_relative_eq!(posed.tail_abs, resting.tail_abs, epsilon = 1e-12);
    }
}

#[test]
fn applying_frames_never_touches_the_rest_pose() {
    let rest = humanoid();
    let snapshot = rest.clone();
    let n = rest.joint_count();
    let lengths = vec![0.5; n];
    let offsets = vec![0.2; 3 * rest.offset_slots()];
    for seed in 0..16 {
        let rotations = scattered_rotations(n, seed as f64);
        rest.apply([seed as f64, 0.0, 0.0], Some(&lengths[..]), &rotations, Some(&offsets[..]))
            .unwrap();
    }
    assert_eq!(rest, snapshot);
}

#[test]
fn poses_share_the_joint_order() {
    let rest = humanoid();
    let pose = rest
        .apply([0.0; 3], None, &identity_rotations(rest.joint_count()), None)
        .unwrap();
    assert_eq!(pose.joint_order(), rest.joint_order());
    let names: Vec<&str> = pose.bones().iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, rest.joint_order().iter().collect::<Vec<_>>());
}

#[test]
fn length_overrides_cover_a_prefix_of_joints() {
    let rest = two_chain();
    let pose = rest
        .apply([0.0; 3], Some(&[3.0][..]), &identity_rotations(2), None)
        .unwrap();
    assert_eq!(pose.get("root").unwrap().length(), 3.0);
    assert_eq!(pose.get("child").unwrap().length(), 1.0);
    assert_eq!(pose.get("child").unwrap().tail_abs, Vector3::new(0.0, 4.0, 0.0));
}

#[test]
fn negative_length_override_is_an_error_not_a_flip() {
    let rest = two_chain();
    let err = rest
        .apply([0.0; 3], Some(&[-1.0][..]), &identity_rotations(2), None)
        .unwrap_err();
    assert_eq!(err.category(), "validation");
    assert!(matches!(
        err,
        PoseError::UnreasonableValue {
            field: FrameField::Length,
            index: 0,
            ..
        }
    ));
}

#[test]
fn building_twice_gives_identical_rest_poses() {
    let catalog = JointCatalog::humanoid();
    let source = DescriptorList::from(catalog.joints().to_vec());
    let lengths: Vec<f64> = catalog.joints().iter().map(|j| j.length * 0.95).collect();
    let overrides = RestOverrides::default()
        .with_root_location([0.2, 0.95, -0.4])
        .with_lengths(lengths)
        .with_offsets(vec![-0.11, 0.02, 0.0, 0.11, 0.02, 0.0]);

    let build = || RestPose::build(&catalog, &source, &overrides, SolverConfig::default()).unwrap();
    let first = build();
    let second = build();

    assert_eq!(first.joint_order(), second.joint_order());
    for (a, b) in first.pose().bones().iter().zip(second.pose().bones()) {
        assert_eq!(a.name, b.name);
        assert_eq!(a.head_abs, b.head_abs);
        assert_eq!(a.tail_abs, b.tail_abs);
        assert_eq!(a.rotation_abs, b.rotation_abs);
    }
    assert_eq!(first, second);
}
