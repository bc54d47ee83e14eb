use sky_battle::entities::*;

#[test]
fn entity_clone_and_eq() {
    // Enums derive PartialEq, equality comparisons must work
    assert_eq!(ActorKind::Boss, ActorKind::Boss);
    assert_ne!(ActorKind::Enemy, ActorKind::Boss);
    assert_eq!(ShieldState::Shielded, ShieldState::Shielded);
    assert_ne!(ShieldState::Shielded, ShieldState::Unshielded);
    assert_eq!(Intent::Fire, Intent::Fire);
    assert_ne!(Intent::MoveUp, Intent::MoveDown);

    let kind = ActorKind::UserProjectile;
    assert_eq!(kind.clone(), ActorKind::UserProjectile);
}

#[test]
fn bounds_touching_edges_intersect() {
    let a = Bounds { min_x: 0.0, min_y: 0.0, max_x: 10.0, max_y: 10.0 };
    let touching = Bounds { min_x: 10.0, min_y: 5.0, max_x: 20.0, max_y: 15.0 };
    let apart = Bounds { min_x: 10.5, min_y: 0.0, max_x: 20.0, max_y: 10.0 };
    assert!(a.intersects(&touching));
    assert!(touching.intersects(&a));
    assert!(!a.intersects(&apart));
}

#[test]
fn actor_clone_is_independent() {
    let original = Actor::enemy_plane(1300.0, 200.0);
    let mut cloned = original.clone();

    cloned.translate_x = -50.0;
    cloned.destroy();

    assert_eq!(original.translate_x, 0.0);
    assert!(!original.is_destroyed());
    assert_eq!(original.id, ActorId::UNASSIGNED);
}
