use crate::beachline::ArcKey;
use crate::diagram::SiteIndex;
use cgmath::Point2;
use std::cell::RefCell;
use std::cmp::Ordering;
use std::rc::{Rc, Weak};

#[derive(Debug)]
pub enum EventType {
    /// The sweep line reaches a new input site; a new arc appears.
    SiteEvent { site: SiteIndex },
    /// Three consecutive arcs converge at `point` (the circumcenter of their
    /// sites); `arc` is the middle arc that disappears.
    CircleEvent { point: Point2<f64>, arc: ArcKey },
}

/// A queued sweep event. `y` is the sweep position at which it fires: the
/// site's y for a site event, `center.y - radius` for a circle event.
/// `index` is the event's current slot in the queue's heap array, kept up to
/// date through every swap so invalidated circle events can be removed by
/// index.
#[derive(Debug)]
pub struct Event {
    pub y: f64,
    pub index: usize,
    pub event_type: EventType,
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Event) -> Option<Ordering> {
        self.y.partial_cmp(&other.y)
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Event) -> bool {
        self.y == other.y
    }
}

/// Binary max-heap of events: `pop` yields the event with the largest `y`,
/// so the sweep line moves downward through the plane.
///
/// Events are owned by the queue as `Rc<RefCell<_>>`; arcs keep `Weak`
/// handles to the circle event that would remove them, which is how the
/// sweep invalidates events whose arc neighborhood has changed.
pub struct EventQueue {
    queue: Vec<Rc<RefCell<Event>>>,
}

fn get_parent(index: usize) -> usize {
    (index + 1) / 2 - 1
}

fn get_left(index: usize) -> usize {
    2 * (index + 1) - 1
}

fn get_right(index: usize) -> usize {
    2 * (index + 1)
}

impl EventQueue {
    pub fn new() -> Self {
        EventQueue { queue: vec![] }
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn add_site_event(&mut self, y: f64, site: SiteIndex) -> Weak<RefCell<Event>> {
        self.add_event(Event {
            y,
            index: self.queue.len(),
            event_type: EventType::SiteEvent { site },
        })
    }

    pub fn add_circle_event(
        &mut self,
        y: f64,
        point: Point2<f64>,
        arc: ArcKey,
    ) -> Weak<RefCell<Event>> {
        self.add_event(Event {
            y,
            index: self.queue.len(),
            event_type: EventType::CircleEvent { point, arc },
        })
    }

    fn add_event(&mut self, event: Event) -> Weak<RefCell<Event>> {
        let index = event.index;
        let event = Rc::new(RefCell::new(event));
        let weak_event = Rc::downgrade(&event);
        self.queue.push(event);
        self.sift_up(index);
        weak_event
    }

    /// Removes and returns the event with the largest `y`.
    pub fn pop(&mut self) -> Option<Event> {
        if self.queue.is_empty() {
            return None;
        }
        let last = self.queue.len() - 1;
        self.swap(0, last);
        let popped_event = self.queue.pop().unwrap();
        self.sift_down(0);
        match Rc::try_unwrap(popped_event) {
            Ok(event) => Some(event.into_inner()),
            Err(_rc) => panic!("popped event still referenced by an arc"),
        }
    }

    /// Removes the event behind a weak handle, if it is still queued.
    pub fn remove(&mut self, event: &Weak<RefCell<Event>>) {
        if let Some(event) = event.upgrade() {
            let index = event.borrow().index;
            self.remove_at(index);
        }
    }

    fn remove_at(&mut self, index: usize) {
        let last = self.queue.len() - 1;
        self.swap(index, last);
        self.queue.pop();
        if index < self.queue.len() {
            self.update(index);
        }
    }

    fn update(&mut self, index: usize) {
        if index > 0 && *self.queue[get_parent(index)].borrow() < *self.queue[index].borrow() {
            self.sift_up(index);
        } else {
            self.sift_down(index);
        }
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 && *self.queue[get_parent(index)].borrow() < *self.queue[index].borrow() {
            self.swap(index, get_parent(index));
            index = get_parent(index);
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        loop {
            let mut largest = index;
            let left = get_left(index);
            let right = get_right(index);
            if left < self.queue.len() && *self.queue[largest].borrow() < *self.queue[left].borrow()
            {
                largest = left;
            }
            if right < self.queue.len()
                && *self.queue[largest].borrow() < *self.queue[right].borrow()
            {
                largest = right;
            }
            if largest == index {
                break;
            }
            self.swap(index, largest);
            index = largest;
        }
    }

    fn swap(&mut self, idx_1: usize, idx_2: usize) {
        self.queue.swap(idx_1, idx_2);
        self.queue[idx_1].borrow_mut().index = idx_1;
        self.queue[idx_2].borrow_mut().index = idx_2;
    }
}
