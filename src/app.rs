//! App loop: Wires the actors, the session and a surface together.
//!
//! Everything stateful runs on the thread that calls [`App::run`] or
//! [`App::run_until_settled`]. Helper threads only feed channels:
//!
//! - input events are mapped to [`Action`]s or handed to the prompt editor
//! - scroll actions move the expanded reasoning panel, else the document
//! - network events go straight to the session
//! - each tick drains the frame queue, then redraws if the session's
//!   revision moved

use crate::actor::{InputEvent, KeyCode, Tick};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::frame::FrameQueue;
use crate::session::{Session, Step};
use crate::surface::Surface;
use crate::transport::{NetworkEvent, StreamActor, Transport};
use crate::widget::{PromptEditor, ScrollState, ScrollTarget};
use crossbeam_channel::{select, unbounded, Receiver, Sender};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// What a key press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Send the prompt.
    Submit,
    /// Show the next section.
    NextSection,
    /// Show the previous section.
    PrevSection,
    /// Fold or unfold the reasoning panel.
    ToggleReasoning,
    /// Scroll up one line.
    ScrollUp,
    /// Scroll down one line.
    ScrollDown,
    /// Scroll up one window.
    PageUp,
    /// Scroll down one window.
    PageDown,
    /// Leave the app.
    Quit,
}

impl Action {
    /// Key binding for `event`, if any.
    pub fn from_input(event: &InputEvent) -> Option<Self> {
        let InputEvent::Key { code, modifiers } = event else {
            return None;
        };
        match code {
            KeyCode::Enter => Some(Self::Submit),
            KeyCode::Tab => Some(Self::NextSection),
            KeyCode::BackTab => Some(Self::PrevSection),
            KeyCode::Up => Some(Self::ScrollUp),
            KeyCode::Down => Some(Self::ScrollDown),
            KeyCode::PageUp => Some(Self::PageUp),
            KeyCode::PageDown => Some(Self::PageDown),
            KeyCode::Esc => Some(Self::Quit),
            KeyCode::Char('c') if modifiers.control => Some(Self::Quit),
            KeyCode::Char('t') if modifiers.control => Some(Self::ToggleReasoning),
            _ => None,
        }
    }
}

/// The client: one session, one surface, at most one stream.
pub struct App<S: Surface> {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    session: Session,
    frames: FrameQueue,
    editor: PromptEditor,
    surface: S,
    network_tx: Sender<NetworkEvent>,
    network_rx: Receiver<NetworkEvent>,
    stream: Option<StreamActor>,
    document_scroll: ScrollState,
    reasoning_scroll: ScrollState,
    drawn_revision: Option<u64>,
    interactive: bool,
}

impl<S: Surface> App<S> {
    /// Create an app drawing to `surface`.
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>, surface: S) -> Self {
        let (network_tx, network_rx) = unbounded();
        Self {
            session: Session::new(config.limits),
            config,
            transport,
            frames: FrameQueue::new(),
            editor: PromptEditor::new(),
            surface,
            network_tx,
            network_rx,
            stream: None,
            document_scroll: ScrollState::pinned(),
            reasoning_scroll: ScrollState::pinned(),
            drawn_revision: None,
            interactive: false,
        }
    }

    /// The session.
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// The prompt editor.
    pub const fn editor(&self) -> &PromptEditor {
        &self.editor
    }

    /// The surface.
    pub const fn surface(&self) -> &S {
        &self.surface
    }

    /// Give back the surface.
    pub fn into_surface(mut self) -> S {
        self.shutdown();
        self.surface
    }

    // =========================================================================
    // Loops
    // =========================================================================

    /// Run until the user quits or the input channel closes.
    ///
    /// # Errors
    ///
    /// Returns an error if drawing fails.
    pub fn run(&mut self, input: &Receiver<InputEvent>, ticks: &Receiver<Tick>) -> Result<()> {
        self.interactive = true;
        self.redraw()?;

        let network = self.network_rx.clone();
        loop {
            select! {
                recv(input) -> event => match event {
                    Ok(event) => {
                        if !self.handle_input(event) {
                            break;
                        }
                    }
                    Err(_) => break,
                },
                recv(network) -> event => {
                    if let Ok(event) = event {
                        self.handle_network(event);
                    }
                },
                recv(ticks) -> tick => match tick {
                    Ok(_) => self.on_tick()?,
                    Err(_) => break,
                },
            }
        }

        self.shutdown();
        Ok(())
    }

    /// Submit `prompt` once and pump until the request settles.
    ///
    /// Returns the final step: [`Step::Complete`] or [`Step::Error`], or the
    /// step reached when the ticker stopped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::PromptRejected`] if the prompt is out of bounds, or
    /// an error if drawing fails.
    pub fn run_until_settled(&mut self, prompt: &str, ticks: &Receiver<Tick>) -> Result<Step> {
        self.editor.set_content(prompt);
        if !self.submit() {
            let limits = self.session.limits();
            return Err(Error::PromptRejected {
                min: limits.min_chars,
                max: limits.max_chars,
            });
        }
        self.redraw()?;

        let network = self.network_rx.clone();
        while self.session.is_in_flight() {
            select! {
                recv(network) -> event => {
                    if let Ok(event) = event {
                        self.handle_network(event);
                    }
                },
                recv(ticks) -> tick => {
                    if tick.is_err() {
                        break;
                    }
                    self.on_tick()?;
                },
            }
        }

        self.redraw()?;
        Ok(self.session.step())
    }

    // =========================================================================
    // Handlers
    // =========================================================================

    /// Handle one input event. Returns `false` when the app should exit.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        if let Some(action) = Action::from_input(&event) {
            return self.apply(action);
        }

        match event {
            InputEvent::Resize { width, height } => {
                self.surface.resize(width, height);
                self.drawn_revision = None;
            }
            InputEvent::Error(message) => warn!(%message, "input error"),
            InputEvent::Shutdown => return false,
            other => {
                // The prompt is read-only while a request runs
                if !self.session.is_in_flight() && self.editor.handle_input(&other) {
                    self.drawn_revision = None;
                }
            }
        }
        true
    }

    /// Apply a bound action. Returns `false` for [`Action::Quit`].
    pub fn apply(&mut self, action: Action) -> bool {
        match action {
            Action::Submit => {
                self.submit();
            }
            Action::NextSection => {
                let next = self.session.state().active_section().next();
                self.session.select_section(next);
                self.reset_document_scroll();
            }
            Action::PrevSection => {
                let prev = self.session.state().active_section().prev();
                self.session.select_section(prev);
                self.reset_document_scroll();
            }
            Action::ToggleReasoning => self.session.toggle_reasoning(),
            Action::ScrollUp | Action::ScrollDown | Action::PageUp | Action::PageDown => {
                self.scroll(action);
            }
            Action::Quit => return false,
        }
        true
    }

    /// Hand a network event to the session.
    ///
    /// A section that just completed opens at its first line.
    pub fn handle_network(&mut self, event: NetworkEvent) {
        let was_in_flight = self.session.is_in_flight();
        self.session.handle_network(event, &mut self.frames);
        if self.session.is_in_flight() {
            return;
        }

        if let Some(stream) = self.stream.take() {
            stream.shutdown();
        }
        if was_in_flight && self.session.step() == Step::Complete {
            self.document_scroll.scroll_to_top();
        }
    }

    /// Deliver due frames, then redraw if anything changed.
    ///
    /// # Errors
    ///
    /// Returns an error if drawing fails.
    pub fn on_tick(&mut self) -> Result<()> {
        for token in self.frames.drain_due() {
            self.session.on_frame(token);
        }
        if self.drawn_revision != Some(self.session.revision()) {
            self.redraw()?;
        }
        Ok(())
    }

    fn submit(&mut self) -> bool {
        let Some(submission) = self.session.submit(self.editor.content(), &mut self.frames) else {
            debug!("prompt not submitted");
            return false;
        };

        if let Some(previous) = self.stream.take() {
            previous.shutdown();
        }
        self.document_scroll.scroll_to_bottom();
        self.reasoning_scroll.scroll_to_bottom();
        info!(request = %submission.id, endpoint = %self.config.endpoint, "opening stream");
        self.stream = Some(StreamActor::spawn(
            Arc::clone(&self.transport),
            submission.id,
            submission.request,
            self.network_tx.clone(),
            self.config.chunk_size,
        ));
        true
    }

    /// Streaming sections follow their tail; settled ones open at the head.
    fn reset_document_scroll(&mut self) {
        self.document_scroll = if self.session.is_in_flight() {
            ScrollState::pinned()
        } else {
            ScrollState::head()
        };
    }

    /// The expanded reasoning panel takes the scroll keys.
    fn scroll_target(&self) -> ScrollTarget {
        let reasoning = self.session.reasoning();
        if reasoning.is_empty() || reasoning.is_collapsed() {
            ScrollTarget::Document
        } else {
            ScrollTarget::Reasoning
        }
    }

    fn scroll(&mut self, action: Action) {
        let target = self.scroll_target();
        let Some(extent) = self.surface.scroll_extent(target) else {
            return;
        };
        let state = match target {
            ScrollTarget::Document => &mut self.document_scroll,
            ScrollTarget::Reasoning => &mut self.reasoning_scroll,
        };

        let page = extent.page.max(1);
        match action {
            Action::ScrollUp => state.scroll_up(1, extent),
            Action::ScrollDown => state.scroll_down(1, extent),
            Action::PageUp => state.scroll_up(page, extent),
            Action::PageDown => state.scroll_down(page, extent),
            _ => return,
        }
        self.drawn_revision = None;
    }

    fn redraw(&mut self) -> Result<()> {
        let mut view = self
            .session
            .view(self.editor.content())
            .with_scroll(self.document_scroll, self.reasoning_scroll);
        if self.interactive && !self.session.is_in_flight() {
            view = view.with_prompt_cursor(self.editor.cursor_column());
        }
        self.surface.present(&view)?;
        self.drawn_revision = Some(self.session.revision());
        Ok(())
    }

    fn shutdown(&mut self) {
        self.session.teardown(&mut self.frames);
        if let Some(stream) = self.stream.take() {
            stream.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{KeyModifiers, TickerActor};
    use crate::error::TransportError;
    use crate::protocol::Section;
    use crate::session::{View, CONNECTION_FAILURE_MESSAGE};
    use crate::surface::{TerminalSurface, TranscriptSurface};
    use crate::transport::{ScriptedBody, ScriptedTransport};
    use std::io;
    use std::time::Duration;

    const PROMPT: &str = "Build a PR review agent";

    /// Records what was drawn.
    #[derive(Default)]
    struct Recorder {
        frames: Vec<(Step, String)>,
    }

    impl Surface for Recorder {
        fn present(&mut self, view: &View<'_>) -> io::Result<()> {
            self.frames.push((view.step, view.document.to_string()));
            Ok(())
        }
    }

    fn app_with<S: Surface>(
        bodies: Vec<std::result::Result<ScriptedBody, TransportError>>,
        surface: S,
    ) -> (App<S>, Arc<ScriptedTransport>) {
        let transport = Arc::new(ScriptedTransport::new(bodies));
        let config = ClientConfig {
            chunk_size: 16,
            ..ClientConfig::default()
        };
        let app = App::new(config, transport.clone(), surface);
        (app, transport)
    }

    #[test]
    fn test_action_bindings() {
        assert_eq!(
            Action::from_input(&InputEvent::key(KeyCode::Enter)),
            Some(Action::Submit)
        );
        assert_eq!(
            Action::from_input(&InputEvent::key(KeyCode::BackTab)),
            Some(Action::PrevSection)
        );
        assert_eq!(
            Action::from_input(&InputEvent::Key {
                code: KeyCode::Char('t'),
                modifiers: KeyModifiers::CONTROL,
            }),
            Some(Action::ToggleReasoning)
        );
        assert_eq!(
            Action::from_input(&InputEvent::key(KeyCode::PageUp)),
            Some(Action::PageUp)
        );
        assert_eq!(
            Action::from_input(&InputEvent::key(KeyCode::Down)),
            Some(Action::ScrollDown)
        );
        assert_eq!(Action::from_input(&InputEvent::key(KeyCode::Char('t'))), None);
        assert_eq!(Action::from_input(&InputEvent::Paste("x".into())), None);
    }

    #[test]
    fn test_headless_run_to_completion() {
        let body = ScriptedBody::new(&[
            "data: {\"type\":\"progress\",\"step\":\"retrieving\"}\n",
            "data: {\"type\":\"thinking\",\"content\":\"Considering \"}\n",
            "data: {\"type\":\"progress\",\"step\":\"generating\"}\ndata: {\"type\":\"delta\",",
            "\"field\":\"requirements\",\"content\":\"# Requirements\\n\"}\n",
            "data: {\"type\":\"delta\",\"field\":\"tasks\",\"content\":\"- [ ] build\\n\"}\n",
            "data: {\"type\":\"done\"}\n",
        ]);
        let (mut app, transport) =
            app_with(vec![Ok(body)], TranscriptSurface::new(Vec::new(), Vec::new()));
        let ticker = TickerActor::spawn(Duration::from_millis(2));

        let step = app.run_until_settled(PROMPT, ticker.receiver()).unwrap();
        ticker.join();

        assert_eq!(step, Step::Complete);
        assert_eq!(transport.requests.lock().unwrap()[0].query, PROMPT);

        let committed = app.session().committed().unwrap();
        assert_eq!(committed.get(Section::Requirements), "# Requirements\n");
        assert_eq!(app.session().reasoning().text(), "Considering ");

        let (out, progress) = app.into_surface().into_inner();
        let out = String::from_utf8(out).unwrap();
        let progress = String::from_utf8(progress).unwrap();
        assert!(out.contains("## tasks.md\n\n- [ ] build\n"));
        assert!(progress.ends_with("\u{2713} Specs ready\n"));
    }

    #[test]
    fn test_headless_connection_failure() {
        let (mut app, _) = app_with(vec![Err(TransportError::Status(502))], Recorder::default());
        let ticker = TickerActor::spawn(Duration::from_millis(2));

        let step = app.run_until_settled(PROMPT, ticker.receiver()).unwrap();
        ticker.join();

        assert_eq!(step, Step::Error);
        assert_eq!(app.session().error_message(), Some(CONNECTION_FAILURE_MESSAGE));
        assert_eq!(app.surface().frames.last().unwrap().0, Step::Error);
    }

    #[test]
    fn test_headless_rejects_short_prompt() {
        let (mut app, transport) = app_with(Vec::new(), Recorder::default());
        let ticker = TickerActor::spawn(Duration::from_millis(50));

        let result = app.run_until_settled("short", ticker.receiver());
        ticker.join();

        assert!(matches!(
            result,
            Err(Error::PromptRejected { min: 10, max: 800 })
        ));
        assert!(transport.requests.lock().unwrap().is_empty());
    }

    #[test]
    fn test_typing_and_section_keys() {
        let (mut app, _) = app_with(Vec::new(), Recorder::default());

        for c in "hello".chars() {
            assert!(app.handle_input(InputEvent::key(KeyCode::Char(c))));
        }
        assert_eq!(app.editor().content(), "hello");

        app.handle_input(InputEvent::key(KeyCode::Tab));
        assert_eq!(app.session().state().active_section(), Section::Design);
        app.handle_input(InputEvent::key(KeyCode::BackTab));
        app.handle_input(InputEvent::key(KeyCode::BackTab));
        assert_eq!(app.session().state().active_section(), Section::Tasks);

        // Too short: nothing is sent
        app.handle_input(InputEvent::key(KeyCode::Enter));
        assert!(!app.session().is_in_flight());

        assert!(!app.handle_input(InputEvent::key(KeyCode::Esc)));
    }

    #[test]
    fn test_redraw_only_when_revision_moves() {
        let (mut app, _) = app_with(Vec::new(), Recorder::default());

        app.on_tick().unwrap();
        app.on_tick().unwrap();
        assert_eq!(app.surface().frames.len(), 1);

        app.apply(Action::ToggleReasoning);
        app.on_tick().unwrap();
        app.on_tick().unwrap();
        assert_eq!(app.surface().frames.len(), 2);
    }

    #[test]
    fn test_prompt_locked_while_in_flight() {
        let body = ScriptedBody::new(&["data: {\"type\":\"progress\",\"step\":\"retrieving\"}\n"]);
        let (mut app, _) = app_with(vec![Ok(body)], Recorder::default());

        for c in PROMPT.chars() {
            app.handle_input(InputEvent::key(KeyCode::Char(c)));
        }
        assert!(app.apply(Action::Submit));
        assert!(app.session().is_in_flight());

        app.handle_input(InputEvent::key(KeyCode::Backspace));
        assert_eq!(app.editor().content(), PROMPT);
    }

    /// The most recent frame written by a terminal surface.
    fn last_frame(surface: &TerminalSurface<Vec<u8>>) -> String {
        let all = String::from_utf8(surface.writer().clone()).unwrap();
        let start = all.rfind("\x1b[?25l").unwrap();
        all[start..].to_string()
    }

    fn shows_line(frame: &str, n: usize) -> bool {
        frame.contains(&format!("line {n}\x1b[0m"))
    }

    #[test]
    fn test_completed_section_opens_at_head_and_scrolls() {
        let document: Vec<String> = (0..100).map(|i| format!("line {i}")).collect();
        let delta = serde_json::json!({
            "type": "delta",
            "field": "requirements",
            "content": document.join("\n"),
        });
        let stream = format!("data: {delta}\ndata: {{\"type\":\"done\"}}\n");
        let (mut app, _) = app_with(
            vec![Ok(ScriptedBody::new(&[stream.as_str()]))],
            TerminalSurface::new(Vec::new(), 80, 24),
        );
        let ticker = TickerActor::spawn(Duration::from_millis(2));

        let step = app.run_until_settled(PROMPT, ticker.receiver()).unwrap();
        ticker.join();
        assert_eq!(step, Step::Complete);

        let frame = last_frame(app.surface());
        assert!(shows_line(&frame, 0));
        assert!(!shows_line(&frame, 99));

        for _ in 0..10 {
            assert!(app.handle_input(InputEvent::key(KeyCode::PageDown)));
            app.on_tick().unwrap();
        }
        let frame = last_frame(app.surface());
        assert!(shows_line(&frame, 99));
        assert!(!shows_line(&frame, 0));

        app.handle_input(InputEvent::key(KeyCode::Up));
        app.on_tick().unwrap();
        let frame = last_frame(app.surface());
        assert!(shows_line(&frame, 83));
        assert!(!shows_line(&frame, 99));
    }

    #[test]
    fn test_section_switch_after_completion_opens_at_head() {
        let document: Vec<String> = (0..60).map(|i| format!("line {i}")).collect();
        let delta = serde_json::json!({
            "type": "delta",
            "field": "requirements",
            "content": document.join("\n"),
        });
        let stream = format!("data: {delta}\ndata: {{\"type\":\"done\"}}\n");
        let (mut app, _) = app_with(
            vec![Ok(ScriptedBody::new(&[stream.as_str()]))],
            TerminalSurface::new(Vec::new(), 80, 24),
        );
        let ticker = TickerActor::spawn(Duration::from_millis(2));
        app.run_until_settled(PROMPT, ticker.receiver()).unwrap();
        ticker.join();

        app.handle_input(InputEvent::key(KeyCode::PageDown));
        app.on_tick().unwrap();
        assert!(!shows_line(&last_frame(app.surface()), 0));

        // Requirements -> Design -> Requirements
        app.handle_input(InputEvent::key(KeyCode::Tab));
        app.handle_input(InputEvent::key(KeyCode::BackTab));
        app.on_tick().unwrap();
        assert!(shows_line(&last_frame(app.surface()), 0));
    }

    #[test]
    fn test_scroll_without_extent_is_ignored() {
        let (mut app, _) = app_with(Vec::new(), Recorder::default());
        app.on_tick().unwrap();
        assert!(app.apply(Action::PageUp));
        app.on_tick().unwrap();
        assert_eq!(app.surface().frames.len(), 1);
    }
}
