//! Front-end state for every screen

mod input;

pub use input::TextInput;

use crate::auth::{AuthOutcome, AuthRequest, FormErrors, LoginForm, PasswordResetForm, RegisterForm};
use crate::navigation::{ChatAction, MenuEntry, Navigator, Screen, COMING_SOON, MENU_ENTRIES};
use crate::runtime::{ChatHandle, ChatUpdate, TaskSlot};
use crate::state_machine::{ChatStep, Event};
use crate::transcript::{Message, Origin};
use crate::tui::AppEvent;
use crate::validation::Field;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

// ============================================================================
// Focus rings
// ============================================================================

/// Cycles through the focusable items of a form
#[derive(Debug, Clone, Copy)]
pub struct Focus<T: 'static> {
    items: &'static [T],
    index: usize,
}

impl<T: Copy + PartialEq> Focus<T> {
    const fn new(items: &'static [T]) -> Self {
        Self { items, index: 0 }
    }

    pub fn current(&self) -> T {
        self.items[self.index]
    }

    pub fn is(&self, item: T) -> bool {
        self.current() == item
    }

    pub fn next(&mut self) {
        self.index = (self.index + 1) % self.items.len();
    }

    pub fn prev(&mut self) {
        self.index = (self.index + self.items.len() - 1) % self.items.len();
    }
}

// ============================================================================
// Per-screen views
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginItem {
    Email,
    Password,
    ForgotPassword,
    Submit,
    GovBr,
    Register,
}

impl LoginItem {
    const ALL: &'static [LoginItem] = &[
        LoginItem::Email,
        LoginItem::Password,
        LoginItem::ForgotPassword,
        LoginItem::Submit,
        LoginItem::GovBr,
        LoginItem::Register,
    ];
}

#[derive(Debug, Clone)]
pub struct LoginView {
    pub email: TextInput,
    pub password: TextInput,
    pub errors: FormErrors,
    pub focus: Focus<LoginItem>,
}

impl Default for LoginView {
    fn default() -> Self {
        Self {
            email: TextInput::default(),
            password: TextInput::masked(),
            errors: FormErrors::default(),
            focus: Focus::new(LoginItem::ALL),
        }
    }
}

impl LoginView {
    fn form(&self) -> LoginForm {
        LoginForm {
            email: self.email.value().to_string(),
            password: self.password.value().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterItem {
    Name,
    Cpf,
    Email,
    Phone,
    Password,
    ConfirmPassword,
    Terms,
    Submit,
    Login,
}

impl RegisterItem {
    const ALL: &'static [RegisterItem] = &[
        RegisterItem::Name,
        RegisterItem::Cpf,
        RegisterItem::Email,
        RegisterItem::Phone,
        RegisterItem::Password,
        RegisterItem::ConfirmPassword,
        RegisterItem::Terms,
        RegisterItem::Submit,
        RegisterItem::Login,
    ];
}

#[derive(Debug, Clone)]
pub struct RegisterView {
    pub name: TextInput,
    pub cpf: TextInput,
    pub email: TextInput,
    pub phone: TextInput,
    pub password: TextInput,
    pub confirm_password: TextInput,
    pub accepted_terms: bool,
    pub errors: FormErrors,
    pub focus: Focus<RegisterItem>,
}

impl Default for RegisterView {
    fn default() -> Self {
        Self {
            name: TextInput::default(),
            cpf: TextInput::default(),
            email: TextInput::default(),
            phone: TextInput::default(),
            password: TextInput::masked(),
            confirm_password: TextInput::masked(),
            accepted_terms: false,
            errors: FormErrors::default(),
            focus: Focus::new(RegisterItem::ALL),
        }
    }
}

impl RegisterView {
    fn form(&self) -> RegisterForm {
        RegisterForm {
            name: self.name.value().to_string(),
            cpf: self.cpf.value().to_string(),
            email: self.email.value().to_string(),
            phone: self.phone.value().to_string(),
            password: self.password.value().to_string(),
            confirm_password: self.confirm_password.value().to_string(),
            accepted_terms: self.accepted_terms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForgotItem {
    Email,
    Submit,
    BackToLogin,
}

/// Items on the "email sent" view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SentItem {
    BackToLogin,
    Resend,
}

#[derive(Debug, Clone)]
pub struct ForgotView {
    pub email: TextInput,
    pub error: Option<&'static str>,
    pub sent: bool,
    pub focus: Focus<ForgotItem>,
    pub sent_focus: Focus<SentItem>,
}

impl Default for ForgotView {
    fn default() -> Self {
        Self {
            email: TextInput::default(),
            error: None,
            sent: false,
            focus: Focus::new(&[ForgotItem::Email, ForgotItem::Submit, ForgotItem::BackToLogin]),
            sent_focus: Focus::new(&[SentItem::BackToLogin, SentItem::Resend]),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MenuView {
    pub selected: usize,
    /// Shown after picking a service that is not offered yet
    pub notice: Option<&'static str>,
}

impl MenuView {
    /// Tiles are laid out two per row
    pub const COLUMNS: usize = 2;

    pub fn entry(&self) -> &'static MenuEntry {
        &MENU_ENTRIES[self.selected.min(MENU_ENTRIES.len() - 1)]
    }

    pub fn move_by(&mut self, delta: isize) {
        self.notice = None;
        let last = MENU_ENTRIES.len() - 1;
        self.selected = self.selected.saturating_add_signed(delta).min(last);
    }
}

/// Local mirror of the chat runtime, built from `ChatUpdate`s
#[derive(Debug, Clone, Default)]
pub struct ChatView {
    pub messages: Vec<Message>,
    pub step: ChatStep,
    pub typing: bool,
    pub input: TextInput,
    /// Validator message under the input; cleared on the next keystroke
    pub error: Option<String>,
    pub selected_option: usize,
    /// Lines scrolled up from the bottom
    pub scroll: u16,
}

impl ChatView {
    pub fn apply(&mut self, update: ChatUpdate) {
        match update {
            ChatUpdate::Snapshot {
                messages,
                step,
                typing,
            } => {
                self.messages = messages;
                self.step = step;
                self.typing = typing;
                self.selected_option = 0;
            }
            ChatUpdate::Message(message) => {
                match message.origin {
                    Origin::Bot => self.selected_option = 0,
                    Origin::User => self.input.clear(),
                    Origin::Error => {}
                }
                self.messages.push(message);
                self.scroll = 0;
            }
            ChatUpdate::Typing(typing) => self.typing = typing,
            ChatUpdate::Cleared => {
                self.messages.clear();
                self.scroll = 0;
            }
            ChatUpdate::InputRejected { message } => self.error = Some(message),
            ChatUpdate::StepChanged { step } => {
                self.step = step;
                self.error = None;
            }
        }
    }

    /// Options of the latest bot prompt, when the step wants a choice and
    /// no reply is still being typed
    pub fn options(&self) -> Option<&[String]> {
        if self.typing || self.step.accepts_text() {
            return None;
        }
        self.messages
            .iter()
            .rev()
            .find(|m| m.origin == Origin::Bot)
            .and_then(|m| m.options.as_deref())
    }

    pub fn placeholder(&self) -> &'static str {
        self.step
            .text_rule()
            .map_or("Digite sua mensagem...", |rule| rule.placeholder())
    }

    pub fn select_next(&mut self) {
        if let Some(count) = self.options().map(<[String]>::len) {
            self.selected_option = (self.selected_option + 1).min(count.saturating_sub(1));
        }
    }

    pub fn select_prev(&mut self) {
        self.selected_option = self.selected_option.saturating_sub(1);
    }
}

// ============================================================================
// App
// ============================================================================

pub struct App {
    pub should_quit: bool,
    navigator: Navigator,
    chat_handle: ChatHandle,
    events: mpsc::UnboundedSender<AppEvent>,
    processing_delay: Duration,
    processing: TaskSlot,
    /// Submission waiting on the processing delay
    pub busy: Option<AuthRequest>,
    pub chat: ChatView,
    pub login: LoginView,
    pub register: RegisterView,
    pub forgot: ForgotView,
    pub menu: MenuView,
    pub animation_frame: u8,
}

impl App {
    pub fn new(
        navigator: Navigator,
        chat_handle: ChatHandle,
        events: mpsc::UnboundedSender<AppEvent>,
        processing_delay: Duration,
    ) -> Self {
        Self {
            should_quit: false,
            navigator,
            chat_handle,
            events,
            processing_delay,
            processing: TaskSlot::new(),
            busy: None,
            chat: ChatView::default(),
            login: LoginView::default(),
            register: RegisterView::default(),
            forgot: ForgotView::default(),
            menu: MenuView::default(),
            animation_frame: 0,
        }
    }

    pub fn screen(&self) -> Screen {
        self.navigator.current()
    }

    /// Leaving a screen abandons its pending submission. Forms start empty
    /// every time their screen is entered.
    pub fn navigate(&mut self, screen: Screen) {
        if self.processing.cancel() {
            tracing::debug!(request = ?self.busy, "Abandoned pending submission");
        }
        self.busy = None;
        match screen {
            Screen::Login => self.login = LoginView::default(),
            Screen::Register => self.register = RegisterView::default(),
            Screen::ForgotPassword => self.forgot = ForgotView::default(),
            Screen::Menu => self.menu.notice = None,
            Screen::Splash | Screen::Chat => {}
        }
        self.navigator.navigate(screen);
    }

    pub fn chat_updates(&self) -> broadcast::Receiver<ChatUpdate> {
        self.chat_handle.subscribe()
    }

    pub fn tick(&mut self) {
        self.animation_frame = (self.animation_frame + 1) % 3;
    }

    pub async fn send_chat(&mut self, event: Event) {
        if let Err(e) = self.chat_handle.send(event).await {
            tracing::error!(error = %e, "Chat runtime unavailable");
            self.should_quit = true;
        }
    }

    pub async fn resync_chat(&mut self) {
        if let Err(e) = self.chat_handle.sync().await {
            tracing::error!(error = %e, "Chat runtime unavailable");
            self.should_quit = true;
        }
    }

    /// Send the typed text to the chat; blank input is not sent. The box
    /// keeps its contents until the runtime echoes the accepted text.
    pub async fn submit_chat_text(&mut self) {
        if self.chat.input.value().trim().is_empty() {
            return;
        }
        let text = self.chat.input.value().to_string();
        self.chat.error = None;
        self.send_chat(Event::text(text)).await;
    }

    pub async fn choose_chat_option(&mut self, index: usize) {
        let Some(label) = self
            .chat
            .options()
            .and_then(|options| options.get(index))
            .cloned()
        else {
            return;
        };
        self.send_chat(Event::choice(label)).await;
    }

    /// Back to the login screen with a fresh conversation for the next user
    pub async fn logout(&mut self) {
        tracing::info!("Logout");
        self.send_chat(Event::Begin(ChatAction::Certificates)).await;
        self.navigate(Screen::Login);
    }

    pub async fn open_selected_service(&mut self) {
        let entry = self.menu.entry();
        match entry.action {
            Some(action) => {
                tracing::info!(service = entry.title, "Opening service");
                self.send_chat(Event::Begin(action)).await;
                self.navigate(Screen::Chat);
            }
            None => self.menu.notice = Some(COMING_SOON),
        }
    }

    // ------------------------------------------------------------------------
    // Simulated processing
    // ------------------------------------------------------------------------

    fn start_processing(&mut self, request: AuthRequest) {
        tracing::info!(request = ?request, "Processing submission");
        self.busy = Some(request);
        let events = self.events.clone();
        self.processing
            .schedule(self.processing_delay, move |ticket| async move {
                let _ = events.send(AppEvent::ProcessingDone(ticket));
            });
    }

    pub fn finish_processing(&mut self, ticket: u64) {
        if !self.processing.complete(ticket) {
            tracing::debug!(ticket, "Ignoring stale processing timer");
            return;
        }
        let Some(request) = self.busy.take() else {
            return;
        };
        match request.outcome() {
            AuthOutcome::Navigate(screen) => self.navigate(screen),
            AuthOutcome::ResetLinkSent => self.forgot.sent = true,
            AuthOutcome::Done => {}
        }
    }

    pub fn submit_login(&mut self) {
        match self.login.form().validate() {
            Ok(()) => {
                self.login.errors = FormErrors::default();
                self.start_processing(AuthRequest::Login);
            }
            Err(errors) => self.login.errors = errors,
        }
    }

    pub fn login_with_gov_br(&mut self) {
        self.start_processing(AuthRequest::GovBrLogin);
    }

    pub fn submit_registration(&mut self) {
        match self.register.form().validate() {
            Ok(()) => {
                self.register.errors = FormErrors::default();
                self.start_processing(AuthRequest::Register);
            }
            Err(errors) => {
                tracing::debug!(count = errors.len(), "Registration rejected");
                self.register.errors = errors;
            }
        }
    }

    pub fn submit_password_reset(&mut self) {
        let form = PasswordResetForm {
            email: self.forgot.email.value().to_string(),
        };
        match form.validate() {
            Ok(()) => {
                self.forgot.error = None;
                self.start_processing(AuthRequest::SendResetLink);
            }
            Err(errors) => self.forgot.error = errors.get(Field::Email),
        }
    }

    pub fn resend_reset_link(&mut self) {
        self.start_processing(AuthRequest::ResendResetLink);
    }
}
