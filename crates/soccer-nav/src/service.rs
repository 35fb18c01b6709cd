use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use soccer_core::{Pathfinder, RobotId, Route, RouteError, Vec2};

/// Destinations closer than this are treated as the same request.
const SAME_DESTINATION: f32 = 0.05;

/// A start farther than this from the pending request's start, or from the finished route,
/// needs a fresh search.
const REJOIN_DISTANCE: f32 = 0.25;

#[derive(Debug)]
struct Request {
    robot: RobotId,
    generation: u64,
    from: Vec2,
    to: Vec2,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    origin: Option<Vec2>,
    destination: Option<Vec2>,
    result: Option<Result<Route, RouteError>>,
}

type Slots = Arc<Mutex<HashMap<RobotId, Slot>>>;

/// Runs a blocking [`Pathfinder`] on a worker thread so the control loop never waits on search.
///
/// `find_route` answers from the robot's slot when the destination matches the last request
/// and the robot is still near its route; the answer is re-anchored at the requested start.
/// Otherwise it queues a new search and reports [`RouteError::Pending`]. Every new request and
/// every `cancel` bumps the robot's generation; results computed for an older generation are
/// dropped on arrival.
pub struct RouteService<P>
where
    P: Pathfinder + 'static,
{
    pathfinder: Arc<P>,
    slots: Slots,
    requests: Option<Sender<Request>>,
    worker: Option<JoinHandle<()>>,
}

impl<P> RouteService<P>
where
    P: Pathfinder + 'static,
{
    pub fn spawn(pathfinder: P) -> io::Result<Self> {
        let pathfinder = Arc::new(pathfinder);
        let slots: Slots = Arc::default();
        let (tx, rx) = unbounded();

        let worker = {
            let pathfinder = Arc::clone(&pathfinder);
            let slots = Arc::clone(&slots);
            thread::Builder::new()
                .name("route-worker".into())
                .spawn(move || run_worker(&*pathfinder, &slots, rx))?
        };

        Ok(Self {
            pathfinder,
            slots,
            requests: Some(tx),
            worker: Some(worker),
        })
    }

    pub fn pathfinder(&self) -> &P {
        &self.pathfinder
    }

    /// Number of robots with an outstanding or finished request.
    pub fn tracked(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|s| s.destination.is_some())
            .count()
    }
}

fn run_worker<P>(pathfinder: &P, slots: &Mutex<HashMap<RobotId, Slot>>, rx: Receiver<Request>)
where
    P: Pathfinder + ?Sized,
{
    for req in rx {
        // Skip work that was superseded while queued.
        let current = slots.lock().get(&req.robot).map(|s| s.generation);
        if current != Some(req.generation) {
            continue;
        }

        let result = pathfinder.find_route(req.robot, req.from, req.to);

        let mut slots = slots.lock();
        match slots.get_mut(&req.robot) {
            Some(slot) if slot.generation == req.generation => {
                tracing::debug!(
                    robot = %req.robot,
                    ok = result.is_ok(),
                    "route computed"
                );
                slot.result = Some(result);
            }
            _ => {
                tracing::debug!(robot = %req.robot, "discarding route for superseded request");
            }
        }
    }
}

impl<P> Pathfinder for RouteService<P>
where
    P: Pathfinder + 'static,
{
    fn find_route(&self, robot: RobotId, from: Vec2, to: Vec2) -> Result<Route, RouteError> {
        let mut slots = self.slots.lock();
        let slot = slots.entry(robot).or_default();

        let same = slot
            .destination
            .is_some_and(|d| d.distance(to) <= SAME_DESTINATION);
        if same {
            let near_origin = slot
                .origin
                .is_some_and(|o| o.distance(from) <= REJOIN_DISTANCE);
            match slot.result.take() {
                None if near_origin => return Err(RouteError::Pending(robot)),
                None => {}
                Some(Ok(route)) => {
                    let rejoined = route
                        .distance_to(from)
                        .filter(|d| *d <= REJOIN_DISTANCE)
                        .and_then(|_| route.rejoined_at(from));
                    slot.result = Some(Ok(route));
                    if let Some(rejoined) = rejoined {
                        return Ok(rejoined);
                    }
                    tracing::debug!(robot = %robot, "robot left its route, searching again");
                }
                // Errors are reported once; the next call searches again.
                Some(Err(err)) => {
                    slot.destination = None;
                    return Err(err);
                }
            }
        }

        slot.generation += 1;
        slot.origin = Some(from);
        slot.destination = Some(to);
        slot.result = None;
        let req = Request {
            robot,
            generation: slot.generation,
            from,
            to,
        };

        let sent = self
            .requests
            .as_ref()
            .is_some_and(|tx| tx.send(req).is_ok());
        if !sent {
            tracing::warn!(robot = %robot, "route worker disconnected");
            slot.origin = None;
            slot.destination = None;
            return Err(RouteError::Unreachable { from, to });
        }

        tracing::debug!(robot = %robot, generation = slot.generation, "route pending");
        Err(RouteError::Pending(robot))
    }

    fn next_step(&self, robot: RobotId, route: &Route, position: Vec2) -> Option<Vec2> {
        self.pathfinder.next_step(robot, route, position)
    }

    fn cancel(&self, robot: RobotId) {
        let mut slots = self.slots.lock();
        if let Some(slot) = slots.get_mut(&robot) {
            slot.generation += 1;
            slot.origin = None;
            slot.destination = None;
            slot.result = None;
        }
        drop(slots);
        self.pathfinder.cancel(robot);
    }
}

impl<P> Drop for RouteService<P>
where
    P: Pathfinder + 'static,
{
    fn drop(&mut self) {
        // Closing the channel ends the worker loop.
        self.requests.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
