// Integration tests for the editing session.
//
// These simulate a user building a small scene, editing it, undoing and
// redoing, and deleting objects while history is in flight.

use editor3d_config::{Color, EditorConfig};
use editor3d_core::{EditSession, ObjectId, Property, SceneError, Shape};
use glam::Vec3;

fn radius(session: &EditSession, id: ObjectId) -> f32 {
    match session.scene().get(id).unwrap().shape {
        Shape::Sphere { radius } => radius,
        ref other => panic!("expected sphere, got {other:?}"),
    }
}

// ── Workflows ──────────────────────────────────────────────────────────

#[test]
fn test_edit_undo_branch_workflow() {
    let mut session = EditSession::default();
    let ball = session.create(Shape::sphere(), Some("Ball"));

    for r in ["2", "3", "4"] {
        session.set_property(ball, Property::Radius, r).unwrap();
    }
    session.undo();
    session.undo();
    assert_eq!(radius(&session, ball), 2.0);

    // A new edit abandons the 3 → 4 branch
    session.set_property(ball, Property::Color, "#00ff00").unwrap();
    assert_eq!(session.redo(), None);
    assert_eq!(session.history().len(), 2);

    session.undo();
    session.undo();
    assert_eq!(radius(&session, ball), 1.0);
    assert_eq!(session.scene().get(ball).unwrap().color, Color::DEFAULT_OBJECT);
}

#[test]
fn test_undo_all_then_redo_all_restores_scene() {
    let mut session = EditSession::default();
    let crate_id = session.create(Shape::cuboid(), Some("Crate"));
    let lamp = session.create(Shape::sphere(), Some("Lamp"));

    session.set_property(crate_id, Property::Position, "0 1 0").unwrap();
    session.set_property(lamp, Property::Parent, "Crate").unwrap();
    session.set_property(lamp, Property::Rotation, "0 45 0").unwrap();
    session.set_property(crate_id, Property::Name, "Chest").unwrap();

    let edited: Vec<_> = session.scene().iter().cloned().collect();

    while session.undo().is_some() {}
    let lamp_obj = session.scene().get(lamp).unwrap();
    assert_eq!(lamp_obj.parent, None);
    assert_eq!(lamp_obj.rotation, Vec3::ZERO);
    assert_eq!(session.scene().get(crate_id).unwrap().name, "Crate");

    while session.redo().is_some() {}
    let replayed: Vec<_> = session.scene().iter().cloned().collect();
    assert_eq!(replayed, edited);
}

#[test]
fn test_delete_mid_history_keeps_other_edits_replayable() {
    let mut session = EditSession::default();
    let a = session.create(Shape::cuboid(), Some("A"));
    let b = session.create(Shape::cuboid(), Some("B"));

    session.set_property(a, Property::Width, "2").unwrap();
    session.set_property(b, Property::Width, "3").unwrap();
    session.set_property(a, Property::Width, "4").unwrap();
    session.set_property(b, Property::Height, "5").unwrap();
    session.undo();
    session.undo();
    // Applied: a=2, b=3. Redoable: a=4, b.height=5

    session.delete(a).unwrap();
    assert_eq!(session.history().len(), 2);
    assert_eq!(session.history().cursor(), Some(0));

    assert_eq!(session.redo(), Some(b));
    assert_eq!(
        session.scene().get(b).unwrap().shape,
        Shape::Box {
            length: 1.0,
            width: 3.0,
            height: 5.0
        }
    );
    assert_eq!(session.redo(), None);
}

#[test]
fn test_reparent_undo_after_old_parent_deleted() {
    let mut session = EditSession::default();
    session.create(Shape::cuboid(), Some("Table"));
    let cup = session.create(Shape::sphere(), Some("Cup"));
    let table = session.resolve("Table").unwrap();

    session.set_property(cup, Property::Parent, "Table").unwrap();
    session.set_property(cup, Property::Parent, "none").unwrap();
    session.delete(table).unwrap();

    // Undoing the detach would point at the deleted table
    assert_eq!(session.undo(), Some(cup));
    assert_eq!(session.scene().get(cup).unwrap().parent, None);
}

// ── Errors ─────────────────────────────────────────────────────────────

#[test]
fn test_errors_do_not_touch_history() {
    let mut session = EditSession::default();
    let a = session.create(Shape::cuboid(), Some("A"));
    let b = session.create(Shape::cuboid(), Some("B"));
    session.set_property(b, Property::Parent, "A").unwrap();
    let len = session.history().len();

    assert!(matches!(
        session.set_property(a, Property::Parent, "B"),
        Err(SceneError::ParentCycle { .. })
    ));
    assert!(matches!(
        session.set_property(a, Property::Radius, "1"),
        Err(SceneError::ShapeMismatch { shape: "box", .. })
    ));
    assert!(matches!(
        session.set_property(a, Property::Color, "blue"),
        Err(SceneError::InvalidValue { .. })
    ));
    assert_eq!(session.resolve("C"), Err(SceneError::UnknownName("C".into())));
    assert_eq!(session.history().len(), len);
}

// ── Config ─────────────────────────────────────────────────────────────

#[test]
fn test_bounded_session_history() {
    let config = EditorConfig {
        max_history_depth: Some(3),
        ..Default::default()
    };
    let mut session = EditSession::new(&config);
    let id = session.create(Shape::sphere(), None);
    for r in 2..=10 {
        session
            .set_property(id, Property::Radius, &r.to_string())
            .unwrap();
    }
    let mut undone = 0;
    while session.undo().is_some() {
        undone += 1;
    }
    assert_eq!(undone, 3);
    assert_eq!(radius(&session, id), 7.0);
}
