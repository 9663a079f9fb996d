//! Control strategies that drive the [`Engine`].
//!
//! External agents reach the engine as parsed text and are replayed by
//! [`Scripted`]. [`Idle`] and [`Greedy`] are built-in baselines. [`play`]
//! turns any strategy into the agent output text it would have produced.

use crate::command::{Action, CommandPlan};
use crate::config::BuildingConfig;
use crate::engine::Engine;
use crate::error::Result;
use crate::model::Floor;
use crate::snapshot::Observer;
use crate::traffic::Trace;

/// Chooses one action per elevator each turn.
pub trait Agent {
    /// Called after the turn's arrivals are queued. Must return exactly one
    /// action per elevator, in elevator order.
    fn decide(&mut self, engine: &Engine) -> Vec<Action>;
}

/// Replays a parsed plan. Runs past the end of the plan get no actions.
pub struct Scripted<'p> {
    plan: &'p CommandPlan,
}

impl<'p> Scripted<'p> {
    pub fn new(plan: &'p CommandPlan) -> Self {
        Self { plan }
    }
}

impl Agent for Scripted<'_> {
    fn decide(&mut self, engine: &Engine) -> Vec<Action> {
        let turn = engine.turn();
        if turn < self.plan.n_turns() {
            self.plan.turn(turn).to_vec()
        } else {
            Vec::new()
        }
    }
}

/// Keeps every elevator where it is.
pub struct Idle;

impl Agent for Idle {
    fn decide(&mut self, engine: &Engine) -> Vec<Action> {
        vec![Action::Stay; engine.elevators().len()]
    }
}

/// Serves whatever is closest.
///
/// Each elevator, in index order:
/// 1. opens if someone onboard gets off here, or if it has room for
///    passengers here that no lower-index elevator claimed this turn;
/// 2. otherwise heads for its oldest rider's target;
/// 3. otherwise heads for the nearest floor with unclaimed passengers
///    (lowest floor on ties), or stays.
pub struct Greedy;

impl Agent for Greedy {
    fn decide(&mut self, engine: &Engine) -> Vec<Action> {
        let floors = engine.floors();
        let mut claimed = vec![0; floors.len()];

        engine
            .elevators()
            .iter()
            .map(|elevator| {
                let here = elevator.floor();
                let has_delivery = elevator
                    .passengers()
                    .iter()
                    .any(|p| p.target_floor == here);
                let unclaimed = floors[here].waiting().len().saturating_sub(claimed[here]);
                let pickup = elevator.free_space().min(unclaimed);

                if has_delivery || pickup > 0 {
                    claimed[here] += pickup;
                    return Action::OpenAndExchange;
                }

                let goal = match elevator.passengers().first() {
                    Some(p) => Some(p.target_floor),
                    None if elevator.free_space() > 0 => nearest_unclaimed(floors, &claimed, here),
                    None => None,
                };
                match goal {
                    Some(goal) if goal > here => Action::MoveUp,
                    Some(goal) if goal < here => Action::MoveDown,
                    _ => Action::Stay,
                }
            })
            .collect()
    }
}

fn nearest_unclaimed(floors: &[Floor], claimed: &[usize], here: usize) -> Option<usize> {
    floors
        .iter()
        .filter(|f| f.waiting().len() > claimed[f.index()])
        .map(|f| f.index())
        .min_by_key(|&index| index.abs_diff(here))
}

/// Records every action an agent issues.
struct Transcript<'a, A: ?Sized> {
    inner: &'a mut A,
    actions: Vec<Action>,
}

impl<A: Agent + ?Sized> Agent for Transcript<'_, A> {
    fn decide(&mut self, engine: &Engine) -> Vec<Action> {
        let actions = self.inner.decide(engine);
        self.actions.extend_from_slice(&actions);
        actions
    }
}

struct Discard;

impl Observer for Discard {}

/// Run `agent` over the whole trace and return the plan it issued.
pub fn play<A: Agent + ?Sized>(cfg: &BuildingConfig, trace: &Trace, agent: &mut A) -> Result<CommandPlan> {
    let mut engine = Engine::new(cfg, trace)?;
    let mut transcript = Transcript {
        inner: agent,
        actions: Vec::with_capacity(cfg.turns * cfg.elevators),
    };
    engine.run_with(&mut transcript, &mut Discard)?;
    Ok(CommandPlan::new(cfg.elevators, transcript.actions))
}
