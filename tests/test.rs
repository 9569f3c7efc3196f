use behavior_tree_runtime::{
    channel, BehaviorTree, Breakpoints, Completion, DebugSink, Node, NodeId, NodeInfo,
    NodeSnapshot, Status, TickContext, TreeConfig,
};
use std::{
    cell::RefCell,
    sync::Arc,
    thread,
};

#[derive(Default)]
struct Guard {
    sees_enemy: bool,
    patrol_steps: u32,
    attacks: u32,
}

fn patrol(steps: u32) -> Node<Guard> {
    Node::action(move |guard: &mut Guard, _: &TickContext| {
        guard.patrol_steps += 1;
        if guard.patrol_steps % steps == 0 {
            Status::Success
        } else {
            Status::Running
        }
    })
    .with_label("patrol")
}

fn guard_tree() -> Node<Guard> {
    Node::selector(vec![
        Node::sequence(vec![
            Node::condition(|guard: &Guard| guard.sees_enemy),
            Node::action(|guard: &mut Guard, _: &TickContext| {
                guard.attacks += 1;
                Status::Success
            })
            .with_label("attack"),
        ]),
        patrol(3),
    ])
    .with_label("root")
}

#[test]
fn test_ids_pre_order() {
    let tree = BehaviorTree::new(guard_tree());
    let kinds: Vec<_> = tree
        .snapshot()
        .iter()
        .map(|node| (node.id, node.kind.clone()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (NodeId(0), "Selector".to_owned()),
            (NodeId(1), "Sequence".to_owned()),
            (NodeId(2), "Condition".to_owned()),
            (NodeId(3), "Action".to_owned()),
            (NodeId(4), "Action".to_owned()),
        ]
    );
    assert_eq!(tree.find(NodeId(3)).unwrap().label().unwrap(), "attack");
    assert!(tree.find(NodeId(5)).is_none());
}

#[test]
fn test_frames_and_reset_on_complete() {
    let mut guard = Guard::default();
    let mut tree = BehaviorTree::new(guard_tree());

    assert_eq!(tree.tick(&mut guard, 0.1), Status::Running);
    assert_eq!(tree.frame(), 1);
    assert!(tree.root().is_running());

    assert_eq!(tree.tick(&mut guard, 0.1), Status::Running);
    assert_eq!(tree.tick(&mut guard, 0.1), Status::Success);
    assert_eq!(tree.frame(), 3);
    assert_eq!(guard.patrol_steps, 3);
    // A finished run leaves the tree idle
    assert_eq!(tree.root().last_status(), None);

    guard.sees_enemy = true;
    assert_eq!(tree.tick(&mut guard, 0.1), Status::Success);
    assert_eq!(guard.attacks, 1);
}

#[test]
fn test_keep_status_after_complete() -> anyhow::Result<()> {
    let config = TreeConfig::from_yaml("name: sentry\nreset_on_complete: false")?;
    let mut guard = Guard {
        sees_enemy: true,
        ..Guard::default()
    };
    let mut tree = BehaviorTree::with_config(guard_tree(), config);
    assert_eq!(tree.name(), "sentry");

    assert_eq!(tree.tick(&mut guard, 0.1), Status::Success);
    let snapshot = tree.snapshot();
    assert_eq!(snapshot.last_status, Some(Status::Success));
    assert_eq!(snapshot.children[1].last_status, None);
    Ok(())
}

#[test]
fn test_snapshot_yaml() -> anyhow::Result<()> {
    let mut guard = Guard::default();
    let mut tree = BehaviorTree::new(guard_tree());
    tree.tick(&mut guard, 0.1);

    let snapshot = tree.snapshot();
    let yaml = snapshot.to_yaml()?;
    assert!(yaml.contains("kind: Selector"));
    assert!(yaml.contains("label: root"));
    assert!(yaml.contains("last_status: Running"));

    let parsed: NodeSnapshot = serde_yaml::from_str(&yaml)?;
    assert_eq!(parsed, snapshot);
    Ok(())
}

#[test]
fn test_clamped_delta_time() -> anyhow::Result<()> {
    let config = TreeConfig::from_yaml("max_delta_time: 0.5")?;
    let mut seen = vec![];
    let mut tree = BehaviorTree::with_config(
        Node::action(|seen: &mut Vec<f32>, ctx: &TickContext| {
            seen.push(ctx.delta_time);
            Status::Success
        }),
        config,
    );
    tree.tick(&mut seen, 0.25);
    tree.tick(&mut seen, 3.0);
    assert_eq!(seen, vec![0.25, 0.5]);
    Ok(())
}

#[test]
fn test_invalid_config_rejected() {
    let config = TreeConfig {
        max_delta_time: Some(-1.),
        ..TreeConfig::default()
    };
    let tree = BehaviorTree::<()>::try_with_config(
        Node::timeout(1.0, Node::action(|_: &mut (), _| Status::Running)),
        config,
    );
    assert!(matches!(
        tree,
        Err(behavior_tree_runtime::error::ConfigError::InvalidMaxDeltaTime(_))
    ));
}

#[test]
#[should_panic]
fn test_invalid_config_panics() {
    let config = TreeConfig {
        max_delta_time: Some(f32::NAN),
        ..TreeConfig::default()
    };
    BehaviorTree::<()>::with_config(Node::action(|_: &mut (), _| Status::Success), config);
}

#[test]
fn test_negative_delta_time_does_not_rewind() {
    let mut tree = BehaviorTree::new(Node::timeout(
        1.0,
        Node::action(|_: &mut (), _| Status::Running),
    ));
    for _ in 0..10 {
        assert_eq!(tree.tick(&mut (), -0.5), Status::Running);
    }
    assert_eq!(tree.config(), &TreeConfig::default());
    assert_eq!(tree.tick(&mut (), 0.6), Status::Running);
    assert_eq!(tree.tick(&mut (), 0.6), Status::Failure);
}

#[derive(Default)]
struct Recorder {
    events: RefCell<Vec<String>>,
}

impl DebugSink for Recorder {
    fn before_tick(&self, node: &NodeInfo, ctx: &TickContext) {
        self.events
            .borrow_mut()
            .push(format!("{} enter {}", ctx.frame, node.id));
    }

    fn after_tick(&self, node: &NodeInfo, status: Status, ctx: &TickContext) {
        self.events
            .borrow_mut()
            .push(format!("{} leave {} {:?}", ctx.frame, node.id, status));
    }

    fn on_expr_evaluated(&self, node: &NodeInfo, value: bool) {
        self.events
            .borrow_mut()
            .push(format!("expr {} {}", node.id, value));
    }

    fn on_abort(&self, node: &NodeInfo) {
        self.events.borrow_mut().push(format!("abort {}", node));
    }
}

#[test]
fn test_debug_sink() {
    let recorder = Arc::new(Recorder::default());
    let mut guard = Guard::default();
    let mut tree = BehaviorTree::new(guard_tree());
    tree.set_debug_sink(recorder.clone());

    tree.tick(&mut guard, 0.1);
    assert_eq!(
        *recorder.events.borrow(),
        vec![
            "0 enter #0",
            "0 enter #1",
            "0 enter #2",
            "expr #2 false",
            "0 leave #2 Failure",
            "0 leave #1 Failure",
            "0 enter #4",
            "0 leave #4 Running",
            "0 leave #0 Running",
        ]
    );

    recorder.events.borrow_mut().clear();
    tree.abort();
    assert_eq!(*recorder.events.borrow(), vec!["abort Selector(root) #0"]);
    assert!(!tree.root().is_running());

    assert!(tree.clear_debug_sink().is_some());
    recorder.events.borrow_mut().clear();
    tree.tick(&mut guard, 0.1);
    assert!(recorder.events.borrow().is_empty());
}

#[test]
fn test_breakpoint() {
    let breakpoints = Arc::new(Breakpoints::new());
    breakpoints.set(NodeId(4));

    let controller = {
        let breakpoints = breakpoints.clone();
        thread::spawn(move || loop {
            if let Some(id) = breakpoints.paused_at() {
                breakpoints.resume();
                return id;
            }
            thread::yield_now();
        })
    };

    let mut guard = Guard::default();
    let mut tree = BehaviorTree::new(guard_tree());
    tree.set_debug_sink(breakpoints.clone());
    assert_eq!(tree.tick(&mut guard, 0.1), Status::Running);

    assert_eq!(controller.join().unwrap(), NodeId(4));
    assert_eq!(breakpoints.paused_at(), None);

    // Cleared breakpoints no longer pause
    assert!(breakpoints.clear(NodeId(4)));
    assert!(!breakpoints.clear(NodeId(4)));
    assert_eq!(tree.tick(&mut guard, 0.1), Status::Running);

    breakpoints.set(NodeId(0));
    breakpoints.set(NodeId(4));
    breakpoints.clear_all();
    assert_eq!(tree.tick(&mut guard, 0.1), Status::Success);
    assert_eq!(breakpoints.paused_at(), None);
}

#[derive(Default)]
struct Courier {
    pending: Option<Completion>,
}

fn deliver() -> Node<Courier> {
    Node::async_action(|courier: &mut Courier| {
        let (completion, operation) = channel();
        courier.pending = Some(completion);
        operation
    })
}

#[test]
fn test_channel_from_thread() {
    let mut courier = Courier::default();
    let mut tree = BehaviorTree::new(Node::sequence(vec![deliver(), deliver()]));

    assert_eq!(tree.tick(&mut courier, 0.1), Status::Running);
    let completion = courier.pending.take().unwrap();
    thread::spawn(move || completion.complete(true))
        .join()
        .unwrap();

    // The first delivery finishes and the second starts within the same tick
    assert_eq!(tree.tick(&mut courier, 0.1), Status::Running);
    let completion = courier.pending.take().unwrap();
    thread::spawn(move || completion.complete(false))
        .join()
        .unwrap();
    assert_eq!(tree.tick(&mut courier, 0.1), Status::Failure);
}

#[test]
fn test_abort_cancels_channel() {
    let mut courier = Courier::default();
    let mut tree = BehaviorTree::new(Node::timeout(1.0, deliver()));

    assert_eq!(tree.tick(&mut courier, 0.1), Status::Running);
    let completion = courier.pending.take().unwrap();
    assert!(!completion.is_cancelled());

    tree.abort();
    assert!(completion.is_cancelled());
    assert!(!completion.complete(true));
}

#[test]
fn test_timeout_cancels_channel() {
    let mut courier = Courier::default();
    let mut tree = BehaviorTree::new(Node::timeout(1.0, deliver()));

    assert_eq!(tree.tick(&mut courier, 0.6), Status::Running);
    assert_eq!(tree.tick(&mut courier, 0.6), Status::Failure);
    assert!(courier.pending.take().unwrap().is_cancelled());
}

#[test]
fn test_trace_ticks() -> anyhow::Result<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("trace"))
        .with_test_writer()
        .try_init();

    let config = TreeConfig::from_yaml("name: traced\ntrace_ticks: true")?;
    let mut guard = Guard::default();
    let mut tree = BehaviorTree::with_config(guard_tree(), config);
    let sink = tree.clear_debug_sink();
    assert!(sink.is_some());
    tree.set_debug_sink(sink.unwrap());

    for _ in 0..3 {
        tree.tick(&mut guard, 0.1);
    }
    assert_eq!(guard.patrol_steps, 3);
    Ok(())
}
