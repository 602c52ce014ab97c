//! Key routing for every screen

use crate::app::{App, ForgotItem, LoginItem, MenuView, RegisterItem, SentItem, TextInput};
use crate::navigation::Screen;
use crate::tui::AppEvent;
use crate::validation::Field;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub async fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key).await,
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick(),
        AppEvent::Chat(update) => app.chat.apply(update),
        AppEvent::ChatLagged => app.resync_chat().await,
        AppEvent::ProcessingDone(ticket) => app.finish_processing(ticket),
    }
}

async fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work on any screen
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.screen() {
        Screen::Splash => handle_splash(app, key),
        Screen::Login => handle_login(app, key),
        Screen::Register => handle_register(app, key),
        Screen::ForgotPassword => handle_forgot_password(app, key),
        Screen::Chat => handle_chat(app, key).await,
        Screen::Menu => handle_menu(app, key).await,
    }
}

/// Line editing shared by every text field. Returns whether the key was used.
fn edit(input: &mut TextInput, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => input.insert(c),
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.left(),
        KeyCode::Right => input.right(),
        KeyCode::Home => input.home(),
        KeyCode::End => input.end(),
        KeyCode::F(2) => input.toggle_mask(),
        _ => return false,
    }
    true
}

/// Tab and the vertical arrows move between form items
fn focus_direction(key: KeyEvent) -> Option<bool> {
    match key.code {
        KeyCode::Tab | KeyCode::Down => Some(true),
        KeyCode::BackTab | KeyCode::Up => Some(false),
        _ => None,
    }
}

fn handle_splash(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Char(' ') => app.navigate(Screen::Login),
        KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
        _ => {}
    }
}

fn handle_login(app: &mut App, key: KeyEvent) {
    if let Some(forward) = focus_direction(key) {
        if forward {
            app.login.focus.next();
        } else {
            app.login.focus.prev();
        }
        return;
    }
    if key.code == KeyCode::Esc {
        app.navigate(Screen::Splash);
        return;
    }

    let item = app.login.focus.current();
    if key.code == KeyCode::Enter {
        match item {
            LoginItem::Email => app.login.focus.next(),
            LoginItem::Password | LoginItem::Submit if app.busy.is_none() => app.submit_login(),
            LoginItem::GovBr if app.busy.is_none() => app.login_with_gov_br(),
            LoginItem::ForgotPassword => app.navigate(Screen::ForgotPassword),
            LoginItem::Register => app.navigate(Screen::Register),
            LoginItem::Password | LoginItem::Submit | LoginItem::GovBr => {}
        }
        return;
    }

    let (input, field) = match item {
        LoginItem::Email => (&mut app.login.email, Field::Email),
        LoginItem::Password => (&mut app.login.password, Field::Password),
        _ => return,
    };
    if edit(input, key) {
        app.login.errors.clear(field);
    }
}

fn handle_register(app: &mut App, key: KeyEvent) {
    if let Some(forward) = focus_direction(key) {
        if forward {
            app.register.focus.next();
        } else {
            app.register.focus.prev();
        }
        return;
    }
    if key.code == KeyCode::Esc {
        app.navigate(Screen::Login);
        return;
    }

    let item = app.register.focus.current();
    match (item, key.code) {
        (RegisterItem::Terms, KeyCode::Enter | KeyCode::Char(' ')) => {
            app.register.accepted_terms = !app.register.accepted_terms;
            app.register.errors.clear(Field::Terms);
            return;
        }
        (RegisterItem::Submit, KeyCode::Enter) => {
            if app.busy.is_none() {
                app.submit_registration();
            }
            return;
        }
        (RegisterItem::Login, KeyCode::Enter) => {
            app.navigate(Screen::Login);
            return;
        }
        (_, KeyCode::Enter) => {
            app.register.focus.next();
            return;
        }
        _ => {}
    }

    let view = &mut app.register;
    let (input, field) = match item {
        RegisterItem::Name => (&mut view.name, Field::Name),
        RegisterItem::Cpf => (&mut view.cpf, Field::Cpf),
        RegisterItem::Email => (&mut view.email, Field::Email),
        RegisterItem::Phone => (&mut view.phone, Field::Phone),
        RegisterItem::Password => (&mut view.password, Field::Password),
        RegisterItem::ConfirmPassword => (&mut view.confirm_password, Field::ConfirmPassword),
        RegisterItem::Terms | RegisterItem::Submit | RegisterItem::Login => return,
    };
    if edit(input, key) {
        view.errors.clear(field);
    }
}

fn handle_forgot_password(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Esc {
        app.navigate(Screen::Login);
        return;
    }

    if app.forgot.sent {
        match key.code {
            KeyCode::Tab | KeyCode::Down | KeyCode::BackTab | KeyCode::Up => {
                app.forgot.sent_focus.next();
            }
            KeyCode::Enter => match app.forgot.sent_focus.current() {
                SentItem::BackToLogin => app.navigate(Screen::Login),
                SentItem::Resend if app.busy.is_none() => app.resend_reset_link(),
                SentItem::Resend => {}
            },
            _ => {}
        }
        return;
    }

    if let Some(forward) = focus_direction(key) {
        if forward {
            app.forgot.focus.next();
        } else {
            app.forgot.focus.prev();
        }
        return;
    }

    match (app.forgot.focus.current(), key.code) {
        (ForgotItem::Email | ForgotItem::Submit, KeyCode::Enter) => {
            if app.busy.is_none() {
                app.submit_password_reset();
            }
        }
        (ForgotItem::BackToLogin, KeyCode::Enter) => app.navigate(Screen::Login),
        (ForgotItem::Email, _) => {
            if edit(&mut app.forgot.email, key) {
                app.forgot.error = None;
            }
        }
        _ => {}
    }
}

async fn handle_chat(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.navigate(Screen::Menu);
            return;
        }
        KeyCode::Char('x') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.logout().await;
            return;
        }
        KeyCode::PageUp => {
            app.chat.scroll = app.chat.scroll.saturating_add(5);
            return;
        }
        KeyCode::PageDown => {
            app.chat.scroll = app.chat.scroll.saturating_sub(5);
            return;
        }
        _ => {}
    }

    if app.chat.step.accepts_text() {
        if key.code == KeyCode::Enter {
            app.submit_chat_text().await;
        } else if edit(&mut app.chat.input, key) {
            app.chat.error = None;
        }
        return;
    }

    match key.code {
        KeyCode::Up => app.chat.select_prev(),
        KeyCode::Down | KeyCode::Tab => app.chat.select_next(),
        KeyCode::Enter => {
            let index = app.chat.selected_option;
            app.choose_chat_option(index).await;
        }
        KeyCode::Char(c @ '1'..='9') => {
            let index = (c as usize) - ('1' as usize);
            app.choose_chat_option(index).await;
        }
        _ => {}
    }
}

async fn handle_menu(app: &mut App, key: KeyEvent) {
    // Up/Down jump a whole row
    #[allow(clippy::cast_possible_wrap)]
    let row = MenuView::COLUMNS as isize;
    match key.code {
        KeyCode::Esc | KeyCode::Backspace => app.navigate(Screen::Chat),
        KeyCode::Left => app.menu.move_by(-1),
        KeyCode::Right | KeyCode::Tab => app.menu.move_by(1),
        KeyCode::Up => app.menu.move_by(-row),
        KeyCode::Down => app.menu.move_by(row),
        KeyCode::Enter | KeyCode::Char(' ') => app.open_selected_service().await,
        _ => {}
    }
}
