//! Virtual-clock simulation of the whole controller
//!
//! Advances time in 1 ms ticks. Each tick, in order: button edges for this
//! millisecond go through the real `Debouncer` and `PressQueue` (interrupt
//! context), the real `PressHandler::run` future is polled once (press
//! worker), then the real blink loop of every indicator is polled once.
//! Indicators record their own level changes, and the mode invariant is
//! checked every tick.

use crate::config::timing::DEBOUNCE_MS;
use crate::gpio::traits::mock::MockButton;
use crate::gpio::{Indicator, Line, LineStatus};
use crate::mode::{Mode, ModeFlags};
use crate::press::{AckLink, Debouncer, EdgeOutcome, PressHandler, PressQueue};
use crate::startup::{bring_up, Board};
use crate::tasks::{run_blinker, Clock};
use core::cell::{Cell, RefCell};
use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};
use std::collections::VecDeque;
use std::rc::Rc;

type Trace = Rc<RefCell<Vec<(u64, bool)>>>;
type Task = Pin<Box<dyn Future<Output = ()>>>;

/// Millisecond clock advanced by the simulation loop
struct SimClock {
    now: Cell<u64>,
}

impl Clock for SimClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }

    fn sleep_until(&self, deadline_ms: u64) -> impl Future<Output = ()> {
        core::future::poll_fn(move |_| {
            if self.now.get() >= deadline_ms {
                Poll::Ready(())
            } else {
                Poll::Pending
            }
        })
    }
}

/// Indicator that logs each level change against the virtual clock
struct TracedIndicator {
    clock: &'static SimClock,
    active: bool,
    trace: Trace,
}

impl TracedIndicator {
    fn new(clock: &'static SimClock) -> Self {
        Self {
            clock,
            active: false,
            trace: Trace::default(),
        }
    }
}

impl Indicator for TracedIndicator {
    fn set_active(&mut self, active: bool) {
        if active != self.active {
            self.active = active;
            self.trace.borrow_mut().push((self.clock.now_ms(), active));
        }
    }

    fn toggle(&mut self) {
        self.set_active(!self.active);
    }

    fn is_active(&mut self) -> bool {
        self.active
    }
}

impl LineStatus for TracedIndicator {
    fn is_ready(&mut self) -> bool {
        true
    }
}

pub struct Sim {
    clock: &'static SimClock,
    flags: &'static ModeFlags,
    queue: &'static PressQueue,
    debouncer: Debouncer,
    /// (time, line still reads pressed when re-sampled)
    edges: VecDeque<(u64, bool)>,
    worker: Task,
    blinkers: Vec<Task>,
    /// Indexed by `Line`
    traces: Vec<Trace>,
    accepted: usize,
    last_mode: Mode,
    mode_changes: Vec<(u64, Mode)>,
}

impl Sim {
    pub fn new() -> Self {
        let clock: &'static SimClock = Box::leak(Box::new(SimClock { now: Cell::new(0) }));
        // Deliberately not the power-up mode: bring_up must reset it
        let flags: &'static ModeFlags = Box::leak(Box::new(ModeFlags::new(Mode::Blue)));
        let queue: &'static PressQueue = Box::leak(Box::new(PressQueue::new()));
        let link: &'static AckLink = Box::leak(Box::new(AckLink::new()));

        let board = Board {
            green: TracedIndicator::new(clock),
            ack_green: TracedIndicator::new(clock),
            red: TracedIndicator::new(clock),
            blue: TracedIndicator::new(clock),
            button: MockButton::new(),
        };
        let parts = bring_up(board, flags).expect("board is ready");

        let handler: &'static PressHandler<'static> =
            Box::leak(Box::new(PressHandler::new(flags, queue, link)));
        let worker: Task = Box::pin(async move {
            handler.run().await;
        });

        let mut traces = Vec::new();
        let mut blinkers = Vec::new();
        for blinker in parts.blinkers {
            traces.push(blinker.indicator().trace.clone());
            let task: Task = Box::pin(async move {
                run_blinker(blinker, flags, link, clock).await;
            });
            blinkers.push(task);
        }

        Self {
            clock,
            flags,
            queue,
            debouncer: Debouncer::new(DEBOUNCE_MS),
            edges: VecDeque::new(),
            worker,
            blinkers,
            traces,
            accepted: 0,
            last_mode: flags.mode(),
            mode_changes: Vec::new(),
        }
    }

    fn now(&self) -> u64 {
        self.clock.now_ms()
    }

    /// Schedule a clean press: rising edge, line still high on re-sample.
    pub fn press_at(&mut self, t: u64) {
        self.edge_at(t, true);
    }

    /// Schedule a noise edge: the line already reads released on re-sample.
    pub fn noise_at(&mut self, t: u64) {
        self.edge_at(t, false);
    }

    fn edge_at(&mut self, t: u64, pressed: bool) {
        assert!(t >= self.now(), "edge scheduled in the past");
        let index = self.edges.partition_point(|&(at, _)| at <= t);
        self.edges.insert(index, (t, pressed));
    }

    /// Submit straight to the press queue, bypassing the debouncer.
    pub fn submit_press(&mut self) {
        self.queue.submit();
    }

    /// Run every tick before `t`.
    pub fn run_until(&mut self, t: u64) {
        while self.now() < t {
            self.tick();
        }
    }

    fn tick(&mut self) {
        let now = self.now();

        while let Some(&(at, pressed)) = self.edges.front() {
            if at != now {
                break;
            }
            self.edges.pop_front();
            if self.debouncer.on_edge(now, || pressed) == EdgeOutcome::Accepted {
                self.accepted += 1;
                self.queue.submit();
            }
        }

        let mut cx = Context::from_waker(futures::task::noop_waker_ref());
        let _ = self.worker.as_mut().poll(&mut cx);

        let mode = self.flags.mode();
        if mode != self.last_mode {
            self.last_mode = mode;
            self.mode_changes.push((now, mode));
        }
        assert_ne!(
            self.flags.red_active(),
            self.flags.blue_active(),
            "exactly one mode flag must be set (t={now})"
        );

        for task in &mut self.blinkers {
            let _ = task.as_mut().poll(&mut cx);
        }

        self.clock.now.set(now + 1);
    }

    pub fn accepted(&self) -> usize {
        self.accepted
    }

    pub fn mode(&self) -> Mode {
        self.flags.mode()
    }

    pub fn mode_changes(&self) -> &[(u64, Mode)] {
        &self.mode_changes
    }

    /// Level transitions of a line, oldest first
    pub fn trace(&self, line: Line) -> Vec<(u64, bool)> {
        self.traces[line as usize].borrow().clone()
    }

    pub fn level_at(&self, line: Line, t: u64) -> bool {
        self.trace(line)
            .iter()
            .take_while(|&&(at, _)| at <= t)
            .last()
            .map_or(false, |&(_, level)| level)
    }

    pub fn transitions_after(&self, line: Line, t: u64) -> Vec<(u64, bool)> {
        self.trace(line).into_iter().filter(|&(at, _)| at > t).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::timing::{ACK_SEGMENT_MS, GATE_POLL_MS};
    use crate::config::BLINKERS;
    use crate::press::ACK_PATTERN;

    #[test]
    fn test_power_up_state() {
        let mut sim = Sim::new();
        sim.run_until(1);

        assert_eq!(sim.mode(), Mode::Red);
        assert!(sim.level_at(Line::Green, 0));
        assert!(sim.level_at(Line::AckGreen, 0));
        assert!(sim.level_at(Line::Red, 0));
        assert!(!sim.level_at(Line::Blue, 0));
    }

    #[test]
    fn test_always_on_indicators_invert_every_half_period() {
        let mut sim = Sim::new();
        sim.run_until(41_001);

        for (line, half) in [(Line::Green, 1000), (Line::AckGreen, 2000)] {
            let trace = sim.trace(line);
            // At least ten full periods
            assert!(trace.len() >= 21);
            for (i, &(at, level)) in trace.iter().enumerate() {
                assert_eq!(at, i as u64 * half, "{line:?} transition {i}");
                assert_eq!(level, i % 2 == 0);
            }
        }
    }

    #[test]
    fn test_always_on_indicators_unaffected_by_mode() {
        let mut sim = Sim::new();
        for k in 0..8 {
            sim.press_at(2500 + k * 3000);
        }
        sim.run_until(30_001);

        assert_eq!(sim.mode_changes().len(), 8);
        let trace = sim.trace(Line::Green);
        assert_eq!(trace.len(), 31);
        assert!(trace.iter().enumerate().all(|(i, &(at, _))| at == i as u64 * 1000));
    }

    #[test]
    fn test_acknowledging_indicator_keeps_its_schedule() {
        let mut sim = Sim::new();
        let half = u64::from(BLINKERS[Line::AckGreen as usize].half_period_ms());
        let ack = ACK_PATTERN.len() as u64 * u64::from(ACK_SEGMENT_MS);
        // Mid phase, mid phase, and just before a toggle is due
        let presses = [1100, 5500, 9990];
        for t in presses {
            sim.press_at(t);
        }
        sim.run_until(20_001);
        assert_eq!(sim.mode_changes().len(), presses.len());

        let cycle_level = |t: u64| (t / half) % 2 == 0;
        let acknowledging = |t: u64| presses.iter().any(|&p| t >= p && t < p + ack);
        for (at, level) in sim.trace(Line::AckGreen) {
            if acknowledging(at) {
                continue;
            }
            if presses.iter().any(|&p| at == p + ack) {
                // Pattern over: back to wherever the cycle has got to
                assert_eq!(level, cycle_level(at), "restore at {at}");
            } else {
                assert_eq!(at % half, 0, "off-schedule transition at {at}");
                assert_eq!(level, cycle_level(at), "transition at {at}");
            }
        }

        for k in 1..=10 {
            let t = k * half;
            if !acknowledging(t) {
                assert!(sim.trace(Line::AckGreen).contains(&(t, cycle_level(t))), "no toggle at {t}");
            }
        }
    }

    #[test]
    fn test_spaced_presses_alternate_mode() {
        let mut sim = Sim::new();
        let presses: Vec<u64> = (0..6).map(|k| 1000 + k * 500).collect();
        for &t in &presses {
            sim.press_at(t);
        }
        sim.run_until(5000);

        assert_eq!(sim.accepted(), presses.len());
        let expected: Vec<(u64, Mode)> = presses
            .iter()
            .zip([Mode::Blue, Mode::Red].into_iter().cycle())
            .map(|(&t, mode)| (t, mode))
            .collect();
        assert_eq!(sim.mode_changes(), expected.as_slice());
    }

    #[test]
    fn test_presses_at_window_spacing_all_accepted() {
        let mut sim = Sim::new();
        for k in 0..5 {
            sim.press_at(1000 + k * DEBOUNCE_MS);
        }
        sim.run_until(3000);

        assert_eq!(sim.accepted(), 5);
        // Presses landing while an acknowledgement plays coalesce
        assert_eq!(
            sim.mode_changes(),
            &[(1000, Mode::Blue), (1181, Mode::Red), (1362, Mode::Blue)]
        );
    }

    #[test]
    fn test_presses_inside_window_toggle_once() {
        let mut sim = Sim::new();
        for t in [1000, 1010, 1030, 1079] {
            sim.press_at(t);
        }
        sim.run_until(3000);

        assert_eq!(sim.accepted(), 1);
        assert_eq!(sim.mode_changes(), &[(1000, Mode::Blue)]);
    }

    #[test]
    fn test_double_submission_toggles_once() {
        let mut sim = Sim::new();
        sim.run_until(700);
        sim.submit_press();
        sim.submit_press();
        sim.run_until(2000);

        assert_eq!(sim.mode_changes(), &[(700, Mode::Blue)]);
    }

    #[test]
    fn test_noise_edge_consumes_window() {
        let mut sim = Sim::new();
        sim.noise_at(1000);
        sim.press_at(1040);
        sim.press_at(1080);
        sim.run_until(2000);

        assert_eq!(sim.accepted(), 1);
        assert_eq!(sim.mode_changes(), &[(1080, Mode::Blue)]);
    }

    #[test]
    fn test_press_end_to_end() {
        let mut sim = Sim::new();
        let press = 1100;
        sim.press_at(press);
        sim.run_until(6000);

        assert_eq!(sim.mode_changes(), &[(press, Mode::Blue)]);

        // Acknowledgement: on, off, on, off, one segment each
        let seg = u64::from(ACK_SEGMENT_MS);
        let mid = seg / 2;
        for (i, expected) in [true, false, true, false].into_iter().enumerate() {
            let t = press + i as u64 * seg + mid;
            assert_eq!(sim.level_at(Line::AckGreen, t), expected, "segment {i}");
        }
        // Then the always-on cycle resumes
        assert!(sim.level_at(Line::AckGreen, press + 4 * seg));

        // Red goes dark within one poll interval and stays dark
        assert!(!sim.level_at(Line::Red, press + u64::from(GATE_POLL_MS)));
        assert!(sim
            .transitions_after(Line::Red, press + u64::from(GATE_POLL_MS))
            .is_empty());

        // Blue starts its 1000 ms cycle within one period
        let blue = sim.transitions_after(Line::Blue, press - 1);
        assert!(blue[0].1);
        assert!(blue[0].0 - press <= 1000);
        for pair in blue.windows(2) {
            assert_eq!(pair[1].0 - pair[0].0, 500);
            assert_ne!(pair[0].1, pair[1].1);
        }
    }

    #[test]
    fn test_gated_indicator_dark_within_poll_interval() {
        let poll = u64::from(GATE_POLL_MS);

        for offset in (0..1000).step_by(37) {
            let mut sim = Sim::new();
            let off_press = 2000 + offset;
            let on_press = off_press + 1500;
            sim.press_at(off_press);
            sim.press_at(on_press);
            sim.run_until(on_press + 1000);

            assert!(!sim.level_at(Line::Red, off_press + poll), "offset {offset}");
            let red = sim.transitions_after(Line::Red, off_press + poll);
            // Dark until the flag is set again, then lit within a poll interval
            assert!(red[0].0 >= on_press && red[0].0 <= on_press + poll, "offset {offset}");
            assert!(red[0].1);
        }
    }

    #[test]
    fn test_three_presses_inside_one_window() {
        let mut sim = Sim::new();
        let window = DEBOUNCE_MS;
        sim.press_at(1000);
        sim.press_at(1000 + window - 1);
        sim.press_at(1000 + window - 1);
        sim.run_until(3000);

        assert_eq!(sim.accepted(), 1);
        assert_eq!(sim.mode(), Mode::Blue);
    }

    #[test]
    fn test_chained_near_window_presses_accept_every_other() {
        let mut sim = Sim::new();
        let gap = DEBOUNCE_MS - 1;
        for k in 0..3 {
            sim.press_at(1000 + k * gap);
        }
        sim.run_until(3000);

        // The third edge is measured from the first accepted one
        assert_eq!(sim.accepted(), 2);
        assert_eq!(sim.mode(), Mode::Red);
    }
}
