use std::time::Duration;

use mindcanvas::canvas::{Canvas, DropOutcome};
use mindcanvas::config::Config;
use mindcanvas::error::{CanvasError, GenerateError};
use mindcanvas::generate::ScriptedGenerator;
use mindcanvas::history::History;
use mindcanvas::layout::{CanvasBounds, Clock, ManualClock, nodes_collide};
use mindcanvas::model::Point;
use mindcanvas::workspace::{Workspace, WorkspaceKind, WorkspaceOutput};

const IDEAS: &str = r#"```json
[
  {"full": "Grow herbs on the windowsill", "phrase": "Windowsill herbs", "short": "Herbs", "emoji": "🌿", "type": "idea"},
  {"full": "Which vegetables tolerate shade?", "phrase": "Shade vegetables", "short": "Shade", "emoji": "🌥", "type": "question"},
  {"full": "Join a community allotment", "phrase": "Allotment", "short": "Allotment", "emoji": "🏡", "type": "example"}
]
```"#;

fn assert_no_overlaps(canvas: &Canvas) {
    let circles: Vec<_> = canvas
        .nodes()
        .filter(|node| !node.minimized)
        .map(|node| node.as_circle())
        .collect();
    for (i, a) in circles.iter().enumerate() {
        for b in &circles[i + 1..] {
            assert!(!nodes_collide(a, b), "{} overlaps {}", a.id, b.id);
        }
    }
}

#[test]
fn expand_twice_without_overlaps() {
    let config = Config::default();
    let mut canvas = Canvas::new(CanvasBounds::new(1600.0, 1200.0));
    let root = canvas.add_root("Urban gardening", Point::new(800.0, 600.0), &config.canvas);

    let generator = ScriptedGenerator::new([Ok(IDEAS.to_string()), Ok(IDEAS.to_string())]);
    let children = canvas.expand(&root, 3, &generator, &config).unwrap();
    assert_eq!(children.len(), 3);

    let grandchildren = canvas.expand(&children[0], 3, &generator, &config).unwrap();
    assert_eq!(grandchildren.len(), 3);
    assert_eq!(canvas.len(), 7);
    assert_eq!(canvas.edges().len(), 6);
    assert_no_overlaps(&canvas);

    let question = canvas.node(&children[1]).unwrap();
    assert_eq!(question.item_type, "question");
    assert_eq!(question.content.emoji, "🌥");

    let prompts = generator.prompts();
    assert!(prompts[1].user.contains("Grow herbs on the windowsill"));
}

#[test]
fn failed_generation_releases_parent() {
    let config = Config::default();
    let mut canvas = Canvas::default();
    let root = canvas.add_root("Idea", Point::new(500.0, 500.0), &config.canvas);
    let generator = ScriptedGenerator::new([
        Err(GenerateError::Status {
            status: 429,
            message: "slow down".to_string(),
        }),
        Ok("- retry worked".to_string()),
    ]);

    let err = canvas.expand(&root, 2, &generator, &config).unwrap_err();
    assert!(matches!(err, CanvasError::Generate(GenerateError::Status { status: 429, .. })));
    assert!(!canvas.is_expanding(&root));

    let created = canvas.expand(&root, 2, &generator, &config).unwrap();
    assert_eq!(created.len(), 1);
}

#[test]
fn concurrent_expansions_of_different_parents() {
    let config = Config::default();
    let mut canvas = Canvas::new(CanvasBounds::new(3000.0, 3000.0));
    let left = canvas.add_root("Left", Point::new(800.0, 1500.0), &config.canvas);
    let right = canvas.add_root("Right", Point::new(2200.0, 1500.0), &config.canvas);

    canvas.begin_expansion(&left, 2, &config.generation).unwrap();
    canvas.begin_expansion(&right, 2, &config.generation).unwrap();
    assert!(canvas.begin_expansion(&left, 2, &config.generation).is_err());

    let right_children = canvas
        .complete_expansion(&right, r#"["r1", "r2"]"#, &config)
        .unwrap();
    let left_children = canvas
        .complete_expansion(&left, r#"["l1", "l2"]"#, &config)
        .unwrap();
    assert_eq!(right_children.len(), 2);
    assert_eq!(left_children.len(), 2);
    assert_no_overlaps(&canvas);
}

#[test]
fn undo_restores_deleted_subtree_links() {
    let config = Config::default();
    let mut canvas = Canvas::default();
    let mut history = History::new(config.canvas.history_capacity);
    let root = canvas.add_root("Root", Point::new(1000.0, 1000.0), &config.canvas);
    canvas.begin_expansion(&root, 2, &config.generation).unwrap();
    let children = canvas
        .complete_expansion(&root, "- one\n- two", &config)
        .unwrap();

    history.record(canvas.snapshot());
    canvas.delete_node(&root).unwrap();
    assert!(canvas.edges().is_empty());

    let previous = history.undo(canvas.snapshot()).unwrap();
    canvas.restore(previous);
    assert_eq!(canvas.edges().len(), 2);
    assert_eq!(
        canvas.node(&children[0]).unwrap().parent_id.as_deref(),
        Some(root.as_str())
    );

    let next = history.redo(canvas.snapshot()).unwrap();
    canvas.restore(next);
    assert!(canvas.node(&root).is_none());
}

#[test]
fn drag_onto_neighbour_bounces_back() {
    let config = Config::default();
    let clock = ManualClock::new();
    let mut canvas = Canvas::new(CanvasBounds::new(1600.0, 1200.0));
    let a = canvas.add_node("alpha", Point::new(200.0, 200.0), &config.canvas);
    let b = canvas.add_node("beta", Point::new(700.0, 200.0), &config.canvas);

    let origin = canvas.node(&a).unwrap().position;
    let impact = canvas.node(&b).unwrap().position.offset(10.0, 10.0);
    let outcome = canvas
        .drop_node(&a, impact, origin, clock.now(), &config)
        .unwrap();
    assert_eq!(outcome, DropOutcome::Bouncing { impact });

    clock.advance(Duration::from_millis(config.canvas.bounce_delay_ms));
    let settled = canvas.settle_drags(clock.now(), &config);
    assert_eq!(settled, vec![(a.clone(), origin)]);
    assert_no_overlaps(&canvas);
}

#[test]
fn crowded_origin_keeps_bounced_node_at_origin() {
    let config = Config::default();
    let mut canvas = Canvas::default();
    let origin = Point::new(5000.0, 5000.0);
    let a = canvas.add_node("a", origin, &config.canvas);
    let center = canvas.node(&a).unwrap().center();
    // A dense grid of the largest nodes covers the origin and every ring slot.
    let wide = "x".repeat(200);
    for row in -4..=4 {
        for col in -4..=4 {
            let blocker = center.offset(col as f32 * 150.0, row as f32 * 150.0);
            canvas.add_node(&wide, blocker.offset(-80.0, -80.0), &config.canvas);
        }
    }

    let outcome = canvas
        .drop_node(&a, origin, origin, Duration::ZERO, &config)
        .unwrap();
    assert_eq!(outcome, DropOutcome::Bouncing { impact: origin });

    let due = Duration::from_millis(config.canvas.bounce_delay_ms);
    let settled = canvas.settle_drags(due, &config);
    assert_eq!(settled, vec![(a.clone(), origin)]);
    assert_eq!(canvas.node(&a).unwrap().position, origin);
    assert!(canvas.pending_bounces().is_empty());
}

#[test]
fn workspace_from_selection() {
    let config = Config::default();
    let mut canvas = Canvas::default();
    let a = canvas.add_node("Trees cool streets", Point::new(0.0, 0.0), &config.canvas);
    let b = canvas.add_node("Parks raise property values", Point::new(400.0, 0.0), &config.canvas);
    canvas.select(&a).unwrap();
    canvas.select(&b).unwrap();

    let mut workspace = Workspace::from_selection(WorkspaceKind::CounterArgument, &canvas);
    let (prompt, options) = workspace.prompt(&canvas, &config.generation).unwrap();
    assert!(prompt.user.contains("- Trees cool streets"));
    assert!(prompt.user.contains("- Parks raise property values"));
    assert_eq!(options.count, 5);

    let applied = workspace.apply_response(
        r#"[{"full": "Trees need costly upkeep"}, {"full": "Parks can displace residents"}]"#,
        &config.extract,
    );
    assert!(applied);
    match workspace.output {
        Some(WorkspaceOutput::Points(points)) => assert_eq!(points.len(), 2),
        other => panic!("unexpected output {other:?}"),
    }
}
