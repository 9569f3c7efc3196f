use behavior_tree_runtime::{
    channel, BehaviorTree, Completion, Node, Status, TickContext, TreeConfig,
};
use std::{thread, time::Duration};
use tracing::info;

#[derive(Debug, Default)]
struct Guard {
    position: f32,
    waypoint: usize,
    enemy: Option<f32>,
    backup: Option<Completion>,
    hits: u32,
}

const WAYPOINTS: [f32; 3] = [0., 4., 8.];
const SPEED: f32 = 2.;

fn walk_to(guard: &mut Guard, target: f32, dt: f32) -> Status {
    let step = SPEED * dt;
    let distance = target - guard.position;
    if distance.abs() <= step {
        guard.position = target;
        Status::Success
    } else {
        guard.position += step * distance.signum();
        Status::Running
    }
}

fn build() -> Node<Guard> {
    let engage = Node::reactive_guard(
        |guard: &Guard| guard.enemy.is_some(),
        Node::sequence(vec![
            Node::async_action(|guard: &mut Guard| {
                let (completion, operation) = channel();
                guard.backup = Some(completion);
                operation
            })
            .with_label("call_backup"),
            Node::action(|guard: &mut Guard, ctx: &TickContext| match guard.enemy {
                Some(enemy) => walk_to(guard, enemy, ctx.delta_time),
                None => Status::Failure,
            })
            .with_label("approach"),
            Node::cooldown(
                1.,
                Node::action(|guard: &mut Guard, _: &TickContext| {
                    guard.hits += 1;
                    info!(hits = guard.hits, "attack");
                    Status::Success
                }),
            ),
        ]),
    )
    .with_label("engage");

    let patrol = Node::sequence(vec![
        Node::timeout(
            5.,
            Node::action(|guard: &mut Guard, ctx: &TickContext| {
                walk_to(guard, WAYPOINTS[guard.waypoint], ctx.delta_time)
            }),
        )
        .with_label("walk"),
        Node::action(|guard: &mut Guard, _: &TickContext| {
            guard.waypoint = (guard.waypoint + 1) % WAYPOINTS.len();
            info!(waypoint = guard.waypoint, "next waypoint");
            Status::Success
        }),
    ])
    .with_label("patrol");

    Node::reactive_selector(vec![engage, patrol]).with_label("root")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = TreeConfig::from_yaml(
        "name: patrol\nreset_on_complete: true\nmax_delta_time: 0.5\ntrace_ticks: true",
    )?;
    let mut tree = BehaviorTree::with_config(build(), config);
    let mut guard = Guard::default();

    for frame in 0..40 {
        // The enemy shows up for a while, then leaves
        guard.enemy = (10..25).contains(&frame).then_some(6.);

        if let Some(backup) = guard.backup.take() {
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                backup.complete(true);
            });
        }

        let status = tree.tick(&mut guard, 0.25);
        info!(frame, ?status, position = guard.position, "ticked");
        thread::sleep(Duration::from_millis(30));
    }

    println!("{}", tree.snapshot().to_yaml()?);
    Ok(())
}
