//! Priority-ordered queue of future device activations.

use crate::config::is_peak_hour;
use crate::device::Device;
use crate::error::SystemError;

/// A future activation request with its cost estimate.
///
/// Device fields are denormalized snapshots taken at scheduling time; a
/// later change to the device does not retroactively affect queued tasks.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledTask {
    /// Id of the device to activate.
    pub device_id: String,
    /// Device name at scheduling time.
    pub device_name: String,
    /// Hour of day the activation is requested for (0-23).
    pub scheduled_hour: u8,
    /// Requested run length in minutes (> 0).
    pub duration_minutes: u32,
    /// Priority copied from the device at scheduling time.
    pub priority: u8,
    /// Whether the device was critical at scheduling time.
    pub is_critical: bool,
    /// Cost estimate at the tariff for the scheduled hour.
    pub estimated_cost: f32,
}

impl ScheduledTask {
    /// Builds a task for the device, pricing it at the given tariff.
    ///
    /// `estimated_cost = watts * minutes / 60 / 1000 * tariff`.
    pub fn new(device: &Device, scheduled_hour: u8, duration_minutes: u32, tariff: f32) -> Self {
        let estimated_cost =
            device.consumption_w() * duration_minutes as f32 / 60.0 / 1000.0 * tariff;
        Self {
            device_id: device.id().to_string(),
            device_name: device.name().to_string(),
            scheduled_hour,
            duration_minutes,
            priority: device.priority(),
            is_critical: device.is_critical(),
            estimated_cost,
        }
    }

    /// Whether the task falls in the peak tariff window; off-peak slots are
    /// the cheaper alternative callers may suggest.
    pub fn is_peak(&self) -> bool {
        is_peak_hour(self.scheduled_hour)
    }

    /// Heap ordering: higher priority wins, earlier hour breaks ties.
    fn outranks(&self, other: &Self) -> bool {
        self.priority > other.priority
            || (self.priority == other.priority && self.scheduled_hour < other.scheduled_hour)
    }
}

/// Array-backed binary max-heap of scheduled tasks.
///
/// Ordered by the relation in [`ScheduledTask::outranks`]: the root always
/// outranks (or equals) every other task. The scheduler only orders pending
/// tasks; it never fires them. Backed by a `Vec`, so there is no capacity
/// ceiling.
#[derive(Debug, Default, Clone)]
pub struct TaskScheduler {
    heap: Vec<ScheduledTask>,
}

impl TaskScheduler {
    /// Creates an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a task, restoring the heap property in O(log n).
    pub fn enqueue(&mut self, task: ScheduledTask) {
        self.heap.push(task);
        self.sift_up(self.heap.len() - 1);
    }

    /// Removes and returns the top-ranked task in O(log n).
    ///
    /// # Errors
    ///
    /// `EmptyQueue` if no task is pending.
    pub fn dequeue(&mut self) -> Result<ScheduledTask, SystemError> {
        if self.heap.is_empty() {
            return Err(SystemError::EmptyQueue);
        }
        // Swap root with the last element, shrink, then restore the root.
        let top = self.heap.swap_remove(0);
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        Ok(top)
    }

    /// Returns the top-ranked task without removing it.
    ///
    /// # Errors
    ///
    /// `EmptyQueue` if no task is pending.
    pub fn peek(&self) -> Result<&ScheduledTask, SystemError> {
        self.heap.first().ok_or(SystemError::EmptyQueue)
    }

    /// Whether no task is pending.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Number of pending tasks.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Iterates tasks in heap storage order.
    ///
    /// Only the first element is guaranteed to be top-ranked; callers
    /// wanting rank order should dequeue or re-sort.
    pub fn iter(&self) -> impl Iterator<Item = &ScheduledTask> {
        self.heap.iter()
    }

    /// Pending tasks as a slice in heap storage order.
    pub fn as_slice(&self) -> &[ScheduledTask] {
        &self.heap
    }

    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.heap[index].outranks(&self.heap[parent]) {
                self.heap.swap(index, parent);
                index = parent;
            } else {
                break;
            }
        }
    }

    fn sift_down(&mut self, mut index: usize) {
        let len = self.heap.len();
        loop {
            let mut top = index;
            let left = 2 * index + 1;
            let right = 2 * index + 2;
            if left < len && self.heap[left].outranks(&self.heap[top]) {
                top = left;
            }
            if right < len && self.heap[right].outranks(&self.heap[top]) {
                top = right;
            }
            if top == index {
                break;
            }
            self.heap.swap(index, top);
            index = top;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(priority: u8, hour: u8) -> ScheduledTask {
        let device = Device::new(
            format!("d{priority}-{hour}"),
            "Device",
            1000.0,
            false,
            priority,
        );
        ScheduledTask::new(&device, hour, 60, 10.0)
    }

    #[test]
    fn cost_uses_tariff_and_duration() {
        let device = Device::new("d1", "Washer", 2000.0, false, 5);
        // 2000 W for 30 min = 1.0 kWh; at tariff 20 the estimate is 20.0
        let t = ScheduledTask::new(&device, 10, 30, 20.0);
        assert!((t.estimated_cost - 20.0).abs() < 1e-4);
        assert!(t.is_peak());
        let off = ScheduledTask::new(&device, 23, 30, 10.0);
        assert!(!off.is_peak());
    }

    #[test]
    fn peek_and_dequeue_follow_rank_order() {
        let mut scheduler = TaskScheduler::new();
        scheduler.enqueue(task(5, 10));
        scheduler.enqueue(task(8, 3));
        scheduler.enqueue(task(8, 1));

        assert_eq!(scheduler.len(), 3);
        let top = scheduler.peek().unwrap();
        assert_eq!((top.priority, top.scheduled_hour), (8, 1));

        let order: Vec<(u8, u8)> = std::iter::from_fn(|| scheduler.dequeue().ok())
            .map(|t| (t.priority, t.scheduled_hour))
            .collect();
        assert_eq!(order, vec![(8, 1), (8, 3), (5, 10)]);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn empty_queue_errors() {
        let mut scheduler = TaskScheduler::new();
        assert!(matches!(scheduler.peek(), Err(SystemError::EmptyQueue)));
        assert!(matches!(scheduler.dequeue(), Err(SystemError::EmptyQueue)));
    }

    #[test]
    fn root_outranks_all_after_mixed_operations() {
        let mut scheduler = TaskScheduler::new();
        for (priority, hour) in [(3, 5), (9, 12), (1, 0), (9, 2), (6, 23), (10, 7)] {
            scheduler.enqueue(task(priority, hour));
        }
        scheduler.dequeue().unwrap();
        scheduler.enqueue(task(7, 4));
        scheduler.dequeue().unwrap();

        let root = scheduler.peek().unwrap().clone();
        for t in scheduler.iter() {
            assert!(!t.outranks(&root), "root must outrank every stored task");
        }
    }

    #[test]
    fn grows_past_small_fixed_capacities() {
        let mut scheduler = TaskScheduler::new();
        for i in 0..150 {
            scheduler.enqueue(task((i % 10 + 1) as u8, (i % 24) as u8));
        }
        assert_eq!(scheduler.len(), 150);
        assert_eq!(scheduler.iter().count(), 150);
    }

    #[test]
    fn dequeue_order_is_monotone_in_rank() {
        let mut scheduler = TaskScheduler::new();
        for (priority, hour) in [(2, 8), (10, 22), (5, 5), (5, 3), (8, 0), (1, 1)] {
            scheduler.enqueue(task(priority, hour));
        }
        let mut previous: Option<ScheduledTask> = None;
        while let Ok(next) = scheduler.dequeue() {
            if let Some(prev) = &previous {
                assert!(!next.outranks(prev));
            }
            previous = Some(next);
        }
    }
}
