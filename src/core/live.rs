//! Live views: derived state recomputed whenever one of its input collections changes.
//!
//! A view subscribes to every input, keeps the latest value of each and calls its
//! callback with the recomputed result. Nothing is emitted until every input has
//! delivered at least once. Callbacks never overlap and never see an older state
//! after a newer one; under concurrent writes intermediate states may be skipped.
//! Dropping the [`LiveView`] (or calling
//! [`LiveView::cancel`]) detaches all of its subscriptions.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use tracing::{debug, warn};

use crate::{
    core::services::{
        BudgetService, CategoryBudget, FinancialInputs, FinancialSnapshot, SummaryService,
    },
    domain::{CategoryLimits, Expense},
    errors::Result,
    repository::{Record, UserRepository},
    store::Subscription,
    time::Clock,
};

const MAX_INPUTS: u32 = 32;

struct Shared<S> {
    value: S,
    delivered: u32,
    required: Option<u32>,
    version: u64,
}

/// Newest snapshot waiting to be emitted and the version last handed out.
struct Outbox<S> {
    pending: Option<(u64, S)>,
    emitted: u64,
}

struct Combiner<S> {
    shared: Mutex<Shared<S>>,
    outbox: Mutex<Outbox<S>>,
    emitting: AtomicBool,
    emit: Box<dyn Fn(&S) + Send + Sync>,
    cancelled: Arc<AtomicBool>,
}

/// Clears the emitting flag even if the callback panics.
struct EmittingGuard<'a>(&'a AtomicBool);

impl Drop for EmittingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl<S: Clone> Combiner<S> {
    fn deliver(&self, slot: u32, apply: impl FnOnce(&mut S)) {
        if self.cancelled.load(Ordering::Acquire) {
            return;
        }
        let ready = {
            let mut shared = lock(&self.shared);
            apply(&mut shared.value);
            shared.delivered |= 1 << slot;
            shared.version += 1;
            match shared.required {
                Some(required) if shared.delivered & required == required => {
                    Some((shared.version, shared.value.clone()))
                }
                _ => None,
            }
        };
        self.publish(ready);
    }

    fn arm(&self, slots: u32) {
        let required = if slots >= MAX_INPUTS {
            u32::MAX
        } else {
            (1u32 << slots) - 1
        };
        let ready = {
            let mut shared = lock(&self.shared);
            shared.required = Some(required);
            shared.version += 1;
            (shared.delivered & required == required)
                .then(|| (shared.version, shared.value.clone()))
        };
        self.publish(ready);
    }

    /// Queues `ready` unless a newer snapshot is already queued or emitted.
    fn publish(&self, ready: Option<(u64, S)>) {
        if let Some((version, value)) = ready {
            let mut outbox = lock(&self.outbox);
            let newest = outbox
                .pending
                .as_ref()
                .map_or(outbox.emitted, |(queued, _)| *queued);
            if version > newest {
                outbox.pending = Some((version, value));
            }
        }
        self.drain();
    }

    /// Emits queued snapshots one at a time, in version order. Callbacks run
    /// outside every lock so they may write to the store; a delivery made while
    /// another thread (or the callback itself) is emitting is picked up by the
    /// loop already running.
    fn drain(&self) {
        loop {
            if self
                .emitting
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
            {
                return;
            }
            {
                let _emitting = EmittingGuard(&self.emitting);
                loop {
                    let next = {
                        let mut outbox = lock(&self.outbox);
                        let next = outbox.pending.take();
                        if let Some((version, _)) = &next {
                            outbox.emitted = *version;
                        }
                        next
                    };
                    match next {
                        Some((_, value)) if !self.cancelled.load(Ordering::Acquire) => {
                            (self.emit)(&value)
                        }
                        Some(_) => {}
                        None => break,
                    }
                }
            }
            if lock(&self.outbox).pending.is_none() {
                return;
            }
        }
    }
}

/// Handle keeping a live view attached.
#[must_use = "dropping a LiveView cancels it"]
pub struct LiveView {
    subscriptions: Vec<Subscription>,
    cancelled: Arc<AtomicBool>,
}

impl LiveView {
    pub fn cancel(self) {
        drop(self);
    }

    pub fn input_count(&self) -> usize {
        self.subscriptions.len()
    }
}

impl Drop for LiveView {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::Release);
        debug!(inputs = self.subscriptions.len(), "live view cancelled");
    }
}

/// Assembles a view over state `S` from typed collection watches.
pub struct LiveViewBuilder<'a, S> {
    repo: &'a UserRepository,
    combiner: Arc<Combiner<S>>,
    cancelled: Arc<AtomicBool>,
    subscriptions: Vec<Subscription>,
}

impl<'a, S> LiveViewBuilder<'a, S>
where
    S: Clone + Send + 'static,
{
    pub fn new<F>(repo: &'a UserRepository, initial: S, emit: F) -> Self
    where
        F: Fn(&S) + Send + Sync + 'static,
    {
        let cancelled = Arc::new(AtomicBool::new(false));
        let combiner = Arc::new(Combiner {
            shared: Mutex::new(Shared {
                value: initial,
                delivered: 0,
                required: None,
                version: 0,
            }),
            outbox: Mutex::new(Outbox {
                pending: None,
                emitted: 0,
            }),
            emitting: AtomicBool::new(false),
            emit: Box::new(emit),
            cancelled: Arc::clone(&cancelled),
        });
        Self {
            repo,
            combiner,
            cancelled,
            subscriptions: Vec::new(),
        }
    }

    fn next_slot(&self) -> u32 {
        self.subscriptions.len() as u32
    }

    /// Adds the collection of `T` as an input; `apply` stores it into the state.
    pub fn input<T, F>(mut self, apply: F) -> Result<Self>
    where
        T: Record,
        F: Fn(&mut S, Vec<T>) + Send + Sync + 'static,
    {
        let slot = self.next_slot();
        if slot >= MAX_INPUTS {
            warn!("live view input limit reached; extra input ignored");
            return Ok(self);
        }
        let combiner = Arc::clone(&self.combiner);
        let subscription = self.repo.watch::<T, _>(move |records| {
            combiner.deliver(slot, |state| apply(state, records));
        })?;
        self.subscriptions.push(subscription);
        Ok(self)
    }

    pub fn category_limits<F>(mut self, apply: F) -> Result<Self>
    where
        F: Fn(&mut S, CategoryLimits) + Send + Sync + 'static,
    {
        let slot = self.next_slot();
        let combiner = Arc::clone(&self.combiner);
        let subscription = self.repo.watch_category_limits(move |limits| {
            combiner.deliver(slot, |state| apply(state, limits));
        })?;
        self.subscriptions.push(subscription);
        Ok(self)
    }

    pub fn start(self) -> LiveView {
        let slots = self.subscriptions.len() as u32;
        self.combiner.arm(slots);
        LiveView {
            subscriptions: self.subscriptions,
            cancelled: self.cancelled,
        }
    }
}

/// Dashboard figures kept current against the user's collections.
pub struct DashboardView;

impl DashboardView {
    pub fn watch<F>(repo: &UserRepository, clock: Arc<dyn Clock>, on_update: F) -> Result<LiveView>
    where
        F: Fn(FinancialSnapshot) + Send + Sync + 'static,
    {
        let view = LiveViewBuilder::new(repo, FinancialInputs::default(), move |inputs| {
            on_update(SummaryService::snapshot(inputs, clock.now()))
        })
        .input(|s: &mut FinancialInputs, v| s.incomes = v)?
        .input(|s: &mut FinancialInputs, v| s.expenses = v)?
        .input(|s: &mut FinancialInputs, v| s.allocations = v)?
        .input(|s: &mut FinancialInputs, v| s.savings_boxes = v)?
        .input(|s: &mut FinancialInputs, v| s.investments = v)?
        .input(|s: &mut FinancialInputs, v| s.debts = v)?
        .input(|s: &mut FinancialInputs, v| s.subscriptions = v)?
        .start();
        Ok(view)
    }
}

/// Current-month spending per category against the stored limits.
pub struct BudgetView;

#[derive(Debug, Clone, Default)]
struct BudgetInputs {
    limits: CategoryLimits,
    expenses: Vec<Expense>,
}

impl BudgetView {
    pub fn watch<F>(repo: &UserRepository, clock: Arc<dyn Clock>, on_update: F) -> Result<LiveView>
    where
        F: Fn(Vec<CategoryBudget>) + Send + Sync + 'static,
    {
        let view = LiveViewBuilder::new(repo, BudgetInputs::default(), move |inputs| {
            on_update(BudgetService::progress(
                &inputs.limits,
                &inputs.expenses,
                clock.now(),
            ))
        })
        .category_limits(|s: &mut BudgetInputs, limits| s.limits = limits)?
        .input(|s: &mut BudgetInputs, expenses: Vec<Expense>| s.expenses = expenses)?
        .start();
        Ok(view)
    }
}
