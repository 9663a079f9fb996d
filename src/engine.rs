use crate::agent::{Agent, Scripted};
use crate::command::{Action, Command, CommandPlan};
use crate::config::BuildingConfig;
use crate::error::{Error, Result};
use crate::model::{Elevator, Floor, Passenger};
use crate::score;
use crate::snapshot::{Observer, Recorder, Snapshot};
use crate::traffic::Trace;

/// Simulation engine.
///
/// Holds the building state for one run and advances it one turn at a time.
/// Every elevator starts empty on floor 0.
pub struct Engine<'a> {
    cfg: &'a BuildingConfig,
    trace: &'a Trace,
    turn: usize,
    /// Arrivals of `turn` are already on their floors.
    queued: bool,
    score: u64,
    delivered: usize,
    elevators: Vec<Elevator>,
    floors: Vec<Floor>,
}

impl<'a> Engine<'a> {
    pub fn new(cfg: &'a BuildingConfig, trace: &'a Trace) -> Result<Self> {
        cfg.validate()?;
        if trace.n_floors() != cfg.floors || trace.n_turns() != cfg.turns {
            return Err(Error::Trace(format!(
                "trace covers {} floors and {} turns, config expects {} and {}",
                trace.n_floors(),
                trace.n_turns(),
                cfg.floors,
                cfg.turns
            )));
        }

        Ok(Self {
            cfg,
            trace,
            turn: 0,
            queued: false,
            score: 0,
            delivered: 0,
            elevators: (0..cfg.elevators)
                .map(|id| Elevator::new(id, cfg.capacity))
                .collect(),
            floors: (0..cfg.floors).map(Floor::new).collect(),
        })
    }

    pub fn config(&self) -> &BuildingConfig {
        self.cfg
    }

    /// Index of the turn being played (or about to be).
    pub fn turn(&self) -> usize {
        self.turn
    }

    pub fn is_finished(&self) -> bool {
        self.turn >= self.cfg.turns
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn delivered(&self) -> usize {
        self.delivered
    }

    pub fn elevators(&self) -> &[Elevator] {
        &self.elevators
    }

    pub fn floors(&self) -> &[Floor] {
        &self.floors
    }

    /// Play one turn and return its snapshot.
    ///
    /// New arrivals are queued before `agent` is asked for its actions, so the
    /// agent sees them. Actions apply in elevator-index order, which settles
    /// who boards first when several elevators open on the same floor.
    ///
    /// If the agent returns the wrong number of actions the turn does not
    /// advance, and a later call retries it without queueing its arrivals
    /// again.
    pub fn step<A: Agent + ?Sized>(&mut self, agent: &mut A) -> Result<Snapshot> {
        let turn = self.turn;
        if self.is_finished() {
            return Err(Error::Finished {
                turns: self.cfg.turns,
            });
        }

        if !self.queued {
            for floor in &mut self.floors {
                floor.enqueue(self.trace.arrivals(floor.index(), turn));
            }
            self.queued = true;
        }

        let actions = agent.decide(self);
        if actions.len() != self.cfg.elevators {
            return Err(Error::CommandCount {
                turn,
                expected: self.cfg.elevators,
                found: actions.len(),
            });
        }

        let mut delivered = Vec::new();
        for (elevator, &action) in actions.iter().enumerate() {
            self.apply(Command { elevator, action }, &mut delivered);
        }

        self.score += score::score_delta(turn, &delivered);
        self.delivered += delivered.len();
        log::debug!(
            "turn {turn}: delivered {}, score {}",
            delivered.len(),
            self.score
        );

        let snapshot = Snapshot::record(
            turn,
            &self.elevators,
            &self.floors,
            self.score,
            self.delivered,
        );
        self.turn += 1;
        self.queued = false;

        Ok(snapshot)
    }

    fn apply(&mut self, command: Command, delivered: &mut Vec<Passenger>) {
        let elevator = &mut self.elevators[command.elevator];
        match command.action {
            Action::MoveUp => elevator.move_up(self.cfg.floors),
            Action::MoveDown => elevator.move_down(),
            Action::Stay => {}
            Action::OpenAndExchange => {
                let floor = &mut self.floors[elevator.floor()];
                elevator.exchange(floor, delivered);
            }
        }
    }

    /// Play every remaining turn, handing each snapshot to `observer`.
    pub fn run_with<A, O>(&mut self, agent: &mut A, observer: &mut O) -> Result<()>
    where
        A: Agent + ?Sized,
        O: Observer + ?Sized,
    {
        while !self.is_finished() {
            if !observer.keep_running() {
                return Err(Error::Cancelled { turn: self.turn });
            }
            let snapshot = self.step(agent)?;
            observer.on_turn_end(snapshot);
        }

        log::info!(
            "completed {} turns: delivered {}, score {}",
            self.turn,
            self.delivered,
            self.score
        );

        Ok(())
    }
}

/// Replay `plan` against `trace` and return one snapshot per turn.
pub fn run(cfg: &BuildingConfig, trace: &Trace, plan: &CommandPlan) -> Result<Vec<Snapshot>> {
    let mut engine = Engine::new(cfg, trace)?;
    let mut recorder = Recorder::with_capacity(cfg.turns);
    engine.run_with(&mut Scripted::new(plan), &mut recorder)?;
    Ok(recorder.into_history())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn cfg(floors: usize, elevators: usize, capacity: usize, turns: usize) -> BuildingConfig {
        BuildingConfig {
            floors,
            elevators,
            capacity,
            turns,
            arrival_rate: 0.0,
        }
    }

    fn replay(cfg: &BuildingConfig, trace: &Trace, text: &str) -> Vec<Snapshot> {
        let plan = parse(text, cfg).unwrap();
        run(cfg, trace, &plan).unwrap()
    }

    #[test]
    fn carries_passenger_to_target() {
        let cfg = cfg(3, 1, 1, 4);
        let mut trace = Trace::empty(&cfg);
        trace.add_passenger(0, 0, 2).unwrap();

        let history = replay(&cfg, &trace, "OPEN\nUP\nUP\nOPEN\n");
        assert_eq!(history.len(), 4);

        let first = &history[0];
        assert_eq!(first.elevators[0].floor, 0);
        assert_eq!(first.elevators[0].passengers.len(), 1);
        assert!(first.floors[0].waiting.is_empty());

        assert_eq!(history[2].elevators[0].floor, 2);
        assert_eq!(history[2].elevators[0].passengers[0].wait, 2);
        assert_eq!(history[2].score, 0);

        let last = &history[3];
        assert!(last.elevators[0].passengers.is_empty());
        assert_eq!(last.passengers().count(), 0);
        assert_eq!(last.delivered, 1);
        assert_eq!(last.score, 16);
    }

    #[test]
    fn boundary_moves_are_noops() {
        let cfg = cfg(2, 1, 1, 4);
        let trace = Trace::empty(&cfg);
        let history = replay(&cfg, &trace, "DOWN UP UP DOWN");
        let floors: Vec<usize> = history.iter().map(|s| s.elevators[0].floor).collect();
        assert_eq!(floors, [0, 1, 1, 0]);
    }

    #[test]
    fn lower_index_boards_first() {
        let cfg = cfg(2, 2, 1, 1);
        let mut trace = Trace::empty(&cfg);
        trace.add_passenger(0, 0, 1).unwrap();
        trace.add_passenger(0, 0, 1).unwrap();
        trace.add_passenger(0, 0, 1).unwrap();

        let history = replay(&cfg, &trace, "OPEN OPEN");
        let ids = |e: usize| -> Vec<usize> {
            history[0].elevators[e].passengers.iter().map(|p| p.id).collect()
        };
        assert_eq!(ids(0), [0]);
        assert_eq!(ids(1), [1]);
        assert_eq!(history[0].floors[0].waiting[0].id, 2);
    }

    #[test]
    fn arrivals_appear_on_their_turn() {
        let cfg = cfg(3, 1, 1, 3);
        let mut trace = Trace::empty(&cfg);
        trace.add_passenger(1, 1, 0).unwrap();
        let history = replay(&cfg, &trace, "STAY STAY STAY");
        assert!(history[0].floors[1].waiting.is_empty());
        assert_eq!(history[1].floors[1].waiting[0].wait, 0);
        assert_eq!(history[2].floors[1].waiting[0].wait, 1);
    }

    #[test]
    fn open_on_empty_floor_is_harmless() {
        let cfg = cfg(2, 1, 3, 2);
        let trace = Trace::empty(&cfg);
        let history = replay(&cfg, &trace, "OPEN OPEN");
        assert_eq!(history[1].score, 0);
        assert_eq!(history[1].delivered, 0);
    }

    #[test]
    fn rejects_mismatched_trace() {
        let cfg = cfg(3, 1, 1, 4);
        let other = Trace::empty(&BuildingConfig {
            turns: 5,
            ..cfg.clone()
        });
        assert!(matches!(Engine::new(&cfg, &other), Err(Error::Trace(_))));
    }

    #[test]
    fn short_plan_is_reported() {
        let cfg = cfg(3, 1, 1, 4);
        let trace = Trace::empty(&cfg);
        let plan = CommandPlan::new(1, vec![Action::Stay; 2]);
        assert!(matches!(
            run(&cfg, &trace, &plan),
            Err(Error::CommandCount { turn: 2, .. })
        ));
    }

    #[test]
    fn failed_step_can_be_retried() {
        struct SkipFirst(bool);
        impl Agent for SkipFirst {
            fn decide(&mut self, _engine: &Engine) -> Vec<Action> {
                if std::mem::replace(&mut self.0, true) {
                    vec![Action::Stay]
                } else {
                    Vec::new()
                }
            }
        }

        let cfg = cfg(3, 1, 1, 2);
        let mut trace = Trace::empty(&cfg);
        trace.add_passenger(0, 0, 2).unwrap();

        let mut engine = Engine::new(&cfg, &trace).unwrap();
        let mut agent = SkipFirst(false);
        assert!(matches!(
            engine.step(&mut agent),
            Err(Error::CommandCount {
                turn: 0,
                expected: 1,
                found: 0
            })
        ));
        assert_eq!(engine.turn(), 0);

        let snapshot = engine.step(&mut agent).unwrap();
        assert_eq!(snapshot.turn, 0);
        let ids: Vec<usize> = snapshot.passengers().map(|p| p.id).collect();
        assert_eq!(ids, [0]);
        assert_eq!(ids.len(), trace.n_passengers());

        let snapshot = engine.step(&mut agent).unwrap();
        assert_eq!(snapshot.passengers().count(), 1);
    }

    #[test]
    fn stepping_past_the_end_is_reported() {
        let cfg = cfg(2, 1, 1, 1);
        let trace = Trace::empty(&cfg);
        let plan = CommandPlan::new(1, vec![Action::Stay]);
        let mut engine = Engine::new(&cfg, &trace).unwrap();
        let mut agent = Scripted::new(&plan);
        engine.step(&mut agent).unwrap();
        assert!(engine.is_finished());
        assert!(matches!(
            engine.step(&mut agent),
            Err(Error::Finished { turns: 1 })
        ));
    }

    #[test]
    fn observer_can_cancel() {
        struct StopAfter(usize, usize);
        impl Observer for StopAfter {
            fn on_turn_end(&mut self, _snapshot: Snapshot) {
                self.0 += 1;
            }
            fn keep_running(&self) -> bool {
                self.0 < self.1
            }
        }

        let cfg = cfg(3, 1, 1, 4);
        let trace = Trace::empty(&cfg);
        let plan = CommandPlan::new(1, vec![Action::Stay; 4]);
        let mut engine = Engine::new(&cfg, &trace).unwrap();
        let result = engine.run_with(&mut Scripted::new(&plan), &mut StopAfter(0, 2));
        assert!(matches!(result, Err(Error::Cancelled { turn: 2 })));
        assert_eq!(engine.turn(), 2);
    }
}
