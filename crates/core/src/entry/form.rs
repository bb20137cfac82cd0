//! The entry form tying cells, navigation, flags and submission together.

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    api::DrawService,
    models::{DrawResult, Prediction, WHITE_COUNT},
};

use super::{
    cell::{CellView, EntryKey, InputCell},
    flags::{self, DuplicateFlags},
    nav::{self, Transition},
    sort,
    state::{kind_for, EntryState},
    submit::{
        PendingSubmission, Phase, Resolution, SubmissionStatus, SubmitOutcome, SubmitStart, Ticket,
    },
    BONUS_INDEX, FIRST_INDEX, SLOT_COUNT,
};

/// Values the prediction list asks the form to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefillRequest {
    /// White values in slot order; only the first five are used.
    pub numbers: Vec<u32>,
    /// Bonus value.
    pub powerball: u32,
}

impl From<&Prediction> for PrefillRequest {
    fn from(prediction: &Prediction) -> Self {
        Self {
            numbers: prediction.numbers.iter().take(WHITE_COUNT).copied().collect(),
            powerball: prediction.powerball,
        }
    }
}

impl From<DrawResult> for PrefillRequest {
    fn from(result: DrawResult) -> Self {
        Self {
            numbers: result.numbers.iter().map(|n| u32::from(*n)).collect(),
            powerball: u32::from(result.powerball),
        }
    }
}

/// Notifications the form emits to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    /// The service accepted this draw and the form has been reset.
    Submitted(DrawResult),
}

/// Cloneable handle other components use to queue prefill requests.
#[derive(Debug, Clone)]
pub struct PrefillHandle {
    sender: mpsc::UnboundedSender<PrefillRequest>,
}

impl PrefillHandle {
    /// Queue a request. Returns `false` once the form is gone.
    pub fn request(&self, request: impl Into<PrefillRequest>) -> bool {
        self.sender.send(request.into()).is_ok()
    }
}

/// Segmented entry form: five white cells and one bonus cell.
#[derive(Debug)]
pub struct EntryForm {
    cells: [InputCell; SLOT_COUNT],
    focus: Option<usize>,
    status: SubmissionStatus,
    phase: Phase,
    in_flight: Option<PendingSubmission>,
    next_ticket: u64,
    live: bool,
    prefill_tx: mpsc::UnboundedSender<PrefillRequest>,
    prefill_rx: mpsc::UnboundedReceiver<PrefillRequest>,
    events: Option<mpsc::UnboundedSender<FormEvent>>,
}

impl Default for EntryForm {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryForm {
    /// Empty form with focus on the first white slot.
    pub fn new() -> Self {
        let (prefill_tx, prefill_rx) = mpsc::unbounded_channel();
        let mut form = Self {
            cells: std::array::from_fn(|idx| InputCell::new(idx, kind_for(idx))),
            focus: None,
            status: SubmissionStatus::Idle,
            phase: Phase::Ready,
            in_flight: None,
            next_ticket: 0,
            live: true,
            prefill_tx,
            prefill_rx,
            events: None,
        };
        form.focus_slot(FIRST_INDEX);
        form
    }

    /// Route [`FormEvent`]s to `sink`.
    pub fn with_event_sink(mut self, sink: mpsc::UnboundedSender<FormEvent>) -> Self {
        self.events = Some(sink);
        self
    }

    /// Slot currently being edited.
    pub fn focused(&self) -> Option<usize> {
        self.focus
    }

    /// Annotation to show under the form.
    pub fn status(&self) -> &SubmissionStatus {
        &self.status
    }

    /// Whether a submission is outstanding.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Snapshot of every slot's buffer.
    pub fn state(&self) -> EntryState {
        EntryState::from_slots(std::array::from_fn(|idx| self.cells[idx].buffer().clone()))
    }

    /// Duplicate flags for the current whites.
    pub fn flags(&self) -> DuplicateFlags {
        flags::compute_flags(&self.state())
    }

    /// Render state of all six cells in slot order.
    pub fn views(&self) -> Vec<CellView> {
        let flags = self.flags();
        self.cells
            .iter()
            .map(|cell| cell.view(flags.contains(cell.index())))
            .collect()
    }

    /// Feed a key to the focused cell and follow any navigation it asks for.
    pub fn handle_key(&mut self, key: EntryKey) -> bool {
        let Some(idx) = self.focus else {
            return false;
        };
        self.clear_status();
        let outcome = self.cells[idx].on_key(key);
        if outcome.changed {
            debug!(slot = idx, raw = self.cells[idx].buffer().raw(), "Slot edited");
        }
        if let Some(intent) = outcome.intent {
            self.focus_slot(nav::step(idx, intent));
        }
        outcome.changed
    }

    /// Replace the focused cell's text wholesale, as a paste would.
    pub fn input_text(&mut self, text: &str) -> bool {
        let Some(idx) = self.focus else {
            return false;
        };
        self.clear_status();
        let outcome = self.cells[idx].on_content_change(text);
        if let Some(intent) = outcome.intent {
            self.focus_slot(nav::step(idx, intent));
        }
        outcome.changed
    }

    /// Move editing focus to `index`, sorting the whites when entering the bonus slot.
    pub fn focus_slot(&mut self, index: usize) -> Transition {
        let transition = nav::plan(self.focus, index);
        match transition {
            Transition::Stay => {}
            Transition::Move { to, .. } => {
                self.blur();
                self.gain_focus(to);
            }
            Transition::CommitWhites { .. } => {
                self.blur();
                self.commit_whites();
                self.gain_focus(BONUS_INDEX);
            }
        }
        transition
    }

    /// Drop editing focus without moving it anywhere.
    pub fn blur(&mut self) {
        if let Some(idx) = self.focus.take() {
            self.cells[idx].on_lose_focus();
        }
    }

    fn gain_focus(&mut self, index: usize) {
        self.cells[index].on_gain_focus();
        self.focus = Some(index);
        self.clear_status();
    }

    fn commit_whites(&mut self) {
        let editing = self.cells.iter().position(InputCell::is_being_edited);
        let mut state = self.state();
        if sort::sort_on_commit(&mut state, editing) {
            debug!(whites = ?state.white_values(), "White slots sorted on commit");
            self.load_state(state);
        }
    }

    fn load_state(&mut self, state: EntryState) {
        for (cell, buffer) in self.cells.iter_mut().zip(state.into_slots()) {
            cell.replace_buffer(buffer);
        }
    }

    fn clear_status(&mut self) {
        if !self.status.is_idle() {
            self.status = SubmissionStatus::Idle;
        }
    }

    /// Load values as if typed, without sorting, moving focus or submitting.
    pub fn prefill(&mut self, request: &PrefillRequest) {
        for (idx, cell) in self.cells[..WHITE_COUNT].iter_mut().enumerate() {
            match request.numbers.get(idx) {
                Some(value) => cell.load_value(*value),
                None => cell.clear(),
            }
        }
        self.cells[BONUS_INDEX].load_value(request.powerball);
        self.clear_status();
        debug!(numbers = ?request.numbers, powerball = request.powerball, "Form prefilled");
    }

    /// Handle for queueing prefills from elsewhere in the app.
    pub fn prefill_handle(&self) -> PrefillHandle {
        PrefillHandle {
            sender: self.prefill_tx.clone(),
        }
    }

    /// Apply every queued prefill request, returning how many were applied.
    pub fn drain_prefills(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(request) = self.prefill_rx.try_recv() {
            self.prefill(&request);
            applied += 1;
        }
        applied
    }

    /// Validate and hand out the payload for sending.
    pub fn begin_submit(&mut self) -> SubmitStart {
        if !self.live {
            return SubmitStart::Closed;
        }
        if self.phase == Phase::CallingOut {
            debug!("Submit ignored while a submission is in flight");
            return SubmitStart::InFlight;
        }

        match flags::validate(&self.state()) {
            Err(reason) => {
                debug!(%reason, "Submit rejected");
                self.status = SubmissionStatus::ValidationError(reason.clone());
                SubmitStart::Rejected(reason)
            }
            Ok(result) => {
                self.next_ticket += 1;
                let pending = PendingSubmission {
                    ticket: Ticket(self.next_ticket),
                    result,
                };
                info!(ticket = %pending.ticket, draw = %result.label(), "Submitting result");
                self.phase = Phase::CallingOut;
                self.status = SubmissionStatus::Idle;
                self.in_flight = Some(pending.clone());
                SubmitStart::Dispatched(pending)
            }
        }
    }

    /// Apply the outcome of a submission started with [`Self::begin_submit`].
    pub fn finish_submit(&mut self, ticket: Ticket, outcome: SubmitOutcome) -> Resolution {
        let matches = self
            .in_flight
            .as_ref()
            .is_some_and(|pending| pending.ticket == ticket);
        if !self.live || !matches {
            debug!(%ticket, live = self.live, "Discarding stale submission result");
            return Resolution::Stale;
        }
        let Some(pending) = self.in_flight.take() else {
            return Resolution::Stale;
        };
        self.phase = Phase::Ready;

        match outcome {
            Ok(()) => {
                info!(%ticket, "Result submitted");
                self.reset();
                self.status = SubmissionStatus::Success;
                if let Some(events) = &self.events {
                    if events.send(FormEvent::Submitted(pending.result)).is_err() {
                        debug!("Submitted event dropped; no listener");
                    }
                }
                Resolution::Succeeded
            }
            Err(err) => {
                warn!(%ticket, error = %err, "Result submission failed");
                self.status = SubmissionStatus::TransportError;
                Resolution::Failed
            }
        }
    }

    /// Validate, send through `service`, and apply the outcome.
    ///
    /// Returns `None` when nothing was sent; the status explains why.
    pub async fn submit<S>(&mut self, service: &S) -> Option<Resolution>
    where
        S: DrawService + ?Sized,
    {
        let SubmitStart::Dispatched(pending) = self.begin_submit() else {
            return None;
        };
        let outcome = service.submit_result(&pending.result).await;
        Some(self.finish_submit(pending.ticket, outcome))
    }

    /// Mark the form as gone; later submission results are ignored.
    pub fn close(&mut self) {
        self.live = false;
        self.in_flight = None;
        self.phase = Phase::Ready;
    }

    fn reset(&mut self) {
        self.blur();
        for cell in &mut self.cells {
            cell.clear();
        }
        self.focus_slot(FIRST_INDEX);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::*;
    use crate::{api::ApiError, entry::CellVisual};

    #[derive(Default)]
    struct RecordingService {
        calls: Mutex<Vec<DrawResult>>,
        fail: AtomicBool,
    }

    #[async_trait]
    impl DrawService for RecordingService {
        async fn submit_result(&self, result: &DrawResult) -> Result<(), ApiError> {
            self.calls.lock().push(*result);
            if self.fail.load(Ordering::SeqCst) {
                return Err(ApiError::Status {
                    status: 503,
                    body: "unavailable".to_string(),
                });
            }
            Ok(())
        }

        async fn get_predictions(&self) -> Result<Vec<Prediction>, ApiError> {
            Ok(Vec::new())
        }
    }

    fn type_text(form: &mut EntryForm, text: &str) {
        for ch in text.chars() {
            form.handle_key(EntryKey::Char(ch));
        }
    }

    fn whites(form: &EntryForm) -> Vec<Option<u8>> {
        form.state().white_values().to_vec()
    }

    #[test]
    fn starts_empty_with_focus_on_first_slot() {
        let form = EntryForm::new();
        assert!(form.state().is_empty());
        assert_eq!(form.focused(), Some(0));
        assert!(form.status().is_idle());
        assert_eq!(form.views()[0].visual, CellVisual::Editing);
    }

    #[test]
    fn two_digits_advance_to_next_slot() {
        let mut form = EntryForm::new();
        type_text(&mut form, "4");
        assert_eq!(form.focused(), Some(0));
        type_text(&mut form, "4");
        assert_eq!(form.focused(), Some(1));
        assert_eq!(form.views()[0].display_text, "44");
    }

    #[test]
    fn backspace_on_empty_moves_back() {
        let mut form = EntryForm::new();
        type_text(&mut form, "12");
        assert_eq!(form.focused(), Some(1));
        form.handle_key(EntryKey::Backspace);
        assert_eq!(form.focused(), Some(0));
        // focus selected "12", so backspace clears it
        form.handle_key(EntryKey::Backspace);
        assert_eq!(whites(&form)[0], None);
        form.handle_key(EntryKey::Backspace);
        assert_eq!(form.focused(), Some(0));
    }

    #[test]
    fn arrows_clamp_at_edges() {
        let mut form = EntryForm::new();
        form.handle_key(EntryKey::Left);
        assert_eq!(form.focused(), Some(0));
        for _ in 0..8 {
            form.handle_key(EntryKey::Right);
        }
        assert_eq!(form.focused(), Some(BONUS_INDEX));
        form.handle_key(EntryKey::BackTab);
        assert_eq!(form.focused(), Some(4));
    }

    #[test]
    fn duplicates_are_flagged_and_cleared_live() {
        let mut form = EntryForm::new();
        type_text(&mut form, "0505");
        let flags = form.flags();
        assert!(flags.contains(0) && flags.contains(1));
        assert_eq!(form.views()[0].visual, CellVisual::Duplicate);

        form.focus_slot(1);
        type_text(&mut form, "06");
        assert!(form.flags().is_empty());
    }

    #[test]
    fn entering_bonus_sorts_complete_whites() {
        let mut form = EntryForm::new();
        type_text(&mut form, "4403281912");
        assert_eq!(form.focused(), Some(BONUS_INDEX));
        assert_eq!(
            whites(&form),
            vec![Some(3), Some(12), Some(19), Some(28), Some(44)]
        );
    }

    #[test]
    fn partial_whites_are_not_sorted_on_commit() {
        let mut form = EntryForm::new();
        type_text(&mut form, "12");
        form.focus_slot(2);
        type_text(&mut form, "05");
        type_text(&mut form, "09");
        type_text(&mut form, "03");
        assert_eq!(form.focused(), Some(BONUS_INDEX));
        assert_eq!(whites(&form), vec![Some(12), None, Some(5), Some(9), Some(3)]);
    }

    #[test]
    fn edits_clear_status() {
        let mut form = EntryForm::new();
        assert!(matches!(form.begin_submit(), SubmitStart::Rejected(_)));
        assert!(form.status().is_error());
        form.handle_key(EntryKey::Char('x'));
        assert!(form.status().is_idle());

        form.begin_submit();
        form.focus_slot(3);
        assert!(form.status().is_idle());
    }

    #[tokio::test]
    async fn submits_sorted_draw_and_resets() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut form = EntryForm::new().with_event_sink(tx);
        let service = RecordingService::default();

        type_text(&mut form, "4403281912");
        type_text(&mut form, "17");
        assert_eq!(
            whites(&form),
            vec![Some(3), Some(12), Some(19), Some(28), Some(44)]
        );

        let resolution = form.submit(&service).await;
        assert_eq!(resolution, Some(Resolution::Succeeded));

        let expected = DrawResult {
            numbers: [3, 12, 19, 28, 44],
            powerball: 17,
        };
        assert_eq!(*service.calls.lock(), vec![expected]);
        assert!(form.state().is_empty());
        assert_eq!(form.focused(), Some(0));
        assert_eq!(form.status(), &SubmissionStatus::Success);
        assert_eq!(rx.try_recv().ok(), Some(FormEvent::Submitted(expected)));

        form.handle_key(EntryKey::Char('x'));
        assert!(form.status().is_idle());
    }

    #[tokio::test]
    async fn duplicate_submit_never_reaches_service() {
        let mut form = EntryForm::new();
        let service = RecordingService::default();
        type_text(&mut form, "0505092030");
        type_text(&mut form, "10");
        let before = form.state();

        assert_eq!(form.submit(&service).await, None);
        assert!(service.calls.lock().is_empty());
        assert!(matches!(
            form.status(),
            SubmissionStatus::ValidationError(flags::ValidationError::DuplicateWhites { .. })
        ));
        assert_eq!(form.state(), before);
    }

    #[tokio::test]
    async fn transport_failure_keeps_entry() {
        let mut form = EntryForm::new();
        let service = RecordingService::default();
        service.fail.store(true, Ordering::SeqCst);
        type_text(&mut form, "0102030405");
        type_text(&mut form, "06");
        let before = form.state();

        assert_eq!(form.submit(&service).await, Some(Resolution::Failed));
        assert_eq!(form.status(), &SubmissionStatus::TransportError);
        assert_eq!(form.state(), before);
        assert_eq!(form.phase(), Phase::Ready);

        form.handle_key(EntryKey::Left);
        assert!(form.status().is_idle());
        assert_eq!(form.state(), before);
    }

    #[test]
    fn second_submit_is_ignored_while_in_flight() {
        let mut form = EntryForm::new();
        form.prefill(&PrefillRequest {
            numbers: vec![1, 2, 3, 4, 5],
            powerball: 6,
        });
        let SubmitStart::Dispatched(first) = form.begin_submit() else {
            panic!("expected dispatch");
        };
        assert_eq!(form.begin_submit(), SubmitStart::InFlight);
        assert_eq!(form.finish_submit(first.ticket, Ok(())), Resolution::Succeeded);
        assert_eq!(
            form.finish_submit(first.ticket, Ok(())),
            Resolution::Stale
        );
    }

    #[test]
    fn results_after_close_are_discarded() {
        let mut form = EntryForm::new();
        form.prefill(&PrefillRequest {
            numbers: vec![1, 2, 3, 4, 5],
            powerball: 6,
        });
        let SubmitStart::Dispatched(pending) = form.begin_submit() else {
            panic!("expected dispatch");
        };
        form.close();
        assert_eq!(form.finish_submit(pending.ticket, Ok(())), Resolution::Stale);
        assert!(!form.state().is_empty());
        assert_eq!(form.begin_submit(), SubmitStart::Closed);
    }

    #[test]
    fn prefill_loads_values_in_order_without_sorting() {
        let mut form = EntryForm::new();
        let handle = form.prefill_handle();
        assert!(handle.request(PrefillRequest {
            numbers: vec![40, 4, 22, 31, 1],
            powerball: 11,
        }));
        assert!(handle.request(PrefillRequest {
            numbers: vec![1, 4, 22, 31, 40],
            powerball: 11,
        }));
        assert_eq!(form.drain_prefills(), 2);

        assert_eq!(
            whites(&form),
            vec![Some(1), Some(4), Some(22), Some(31), Some(40)]
        );
        assert_eq!(form.state().bonus_value(), Some(11));
        assert_eq!(form.focused(), Some(0));
        assert!(form.status().is_idle());
    }

    #[test]
    fn prefill_goes_through_clamping() {
        let mut form = EntryForm::new();
        form.prefill(&PrefillRequest {
            numbers: vec![80, 0, 5],
            powerball: 30,
        });
        assert_eq!(whites(&form), vec![Some(69), Some(1), Some(5), None, None]);
        assert_eq!(form.state().bonus_value(), Some(26));
    }

    #[test]
    fn oversized_prefill_values_clamp_to_max() {
        let mut form = EntryForm::new();
        form.prefill(&PrefillRequest {
            numbers: vec![140, 100, 7, 8, 9],
            powerball: 260,
        });
        assert_eq!(
            whites(&form),
            vec![Some(69), Some(69), Some(7), Some(8), Some(9)]
        );
        assert_eq!(form.state().bonus_value(), Some(26));
        assert!(form.flags().contains(0) && form.flags().contains(1));

        form.prefill(&PrefillRequest {
            numbers: vec![1, 2, 3, 4, 5],
            powerball: 99,
        });
        assert_eq!(form.state().bonus_value(), Some(26));
    }
}
