//! Rendering for every screen

use crate::app::{App, ForgotItem, LoginItem, MenuView, RegisterItem, SentItem, TextInput};
use crate::auth::AuthRequest;
use crate::navigation::{Screen, EMERGENCY_NUMBER, MENU_ENTRIES};
use crate::transcript::{Message, Origin};
use crate::validation::Field;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const BRAND: Color = Color::Red;

pub fn render(app: &App, frame: &mut Frame) {
    let area = frame.area();
    match app.screen() {
        Screen::Splash => render_splash(frame, area),
        Screen::Login => render_login(app, frame, area),
        Screen::Register => render_register(app, frame, area),
        Screen::ForgotPassword => render_forgot_password(app, frame, area),
        Screen::Chat => render_chat(app, frame, area),
        Screen::Menu => render_menu(app, frame, area),
    }
}

// ============================================================================
// Shared pieces
// ============================================================================

fn render_header(frame: &mut Frame, area: Rect, title: &str, subtitle: &str, hint: &str) {
    let hint_width = u16::try_from(hint.chars().count() + 2).unwrap_or(u16::MAX);
    let [text_area, hint_area] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(hint_width)]).areas(area);

    let header = Paragraph::new(vec![
        Line::from(Span::styled(format!(" {title}"), Style::default().fg(Color::White).bold())),
        Line::from(Span::styled(
            format!(" {subtitle}"),
            Style::default().fg(Color::Gray),
        )),
    ])
    .style(Style::default().bg(BRAND));
    frame.render_widget(header, text_area);

    let hint = Paragraph::new(Line::from(hint))
        .style(Style::default().bg(BRAND).fg(Color::Gray))
        .alignment(Alignment::Right);
    frame.render_widget(hint, hint_area);
}

/// Bordered input with its error line underneath. Takes four rows, or
/// three when there is never an error to show.
fn render_field(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    input: &TextInput,
    placeholder: &str,
    focused: bool,
    error: Option<&str>,
) {
    let [box_area, error_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(area);

    let border_color = if error.is_some() {
        Color::LightRed
    } else if focused {
        Color::Yellow
    } else {
        Color::DarkGray
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(format!(" {label} "));

    // Keep the cursor visible by scrolling horizontally
    let inner_width = box_area.width.saturating_sub(2) as usize;
    let scroll_offset = if inner_width == 0 || input.cursor() < inner_width {
        0
    } else {
        input.cursor() - inner_width + 1
    };

    let content = if input.is_empty() {
        Span::styled(placeholder.to_string(), Style::default().fg(Color::DarkGray))
    } else {
        let visible: String = input
            .display()
            .chars()
            .skip(scroll_offset)
            .take(inner_width)
            .collect();
        Span::raw(visible)
    };
    frame.render_widget(Paragraph::new(Line::from(content)).block(block), box_area);

    if focused {
        let cursor_x = u16::try_from(input.cursor() - scroll_offset).unwrap_or(0);
        frame.set_cursor_position((box_area.x + cursor_x + 1, box_area.y + 1));
    }

    if let Some(message) = error {
        let line = Line::from(Span::styled(
            format!(" ⚠ {message}"),
            Style::default().fg(Color::LightRed),
        ));
        frame.render_widget(Paragraph::new(line), error_area);
    }
}

fn render_button(frame: &mut Frame, area: Rect, label: &str, focused: bool) {
    let style = if focused {
        Style::default().fg(Color::White).bg(BRAND).bold()
    } else {
        Style::default().fg(BRAND)
    };
    let button = Paragraph::new(Line::from(Span::styled(format!("[ {label} ]"), style)))
        .alignment(Alignment::Center);
    frame.render_widget(button, area);
}

fn render_link(frame: &mut Frame, area: Rect, prefix: &str, label: &str, focused: bool) {
    let mut style = Style::default().fg(Color::LightRed);
    if focused {
        style = style.add_modifier(Modifier::UNDERLINED | Modifier::BOLD);
    }
    let link = Paragraph::new(Line::from(vec![
        Span::styled(prefix.to_string(), Style::default().fg(Color::Gray)),
        Span::styled(label.to_string(), style),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(link, area);
}

fn busy_or<'a>(app: &App, requests: &[AuthRequest], label: &'a str) -> &'a str {
    match app.busy {
        Some(request) if requests.contains(&request) => request.busy_label(),
        _ => label,
    }
}

/// Greedy word wrap by character count; words longer than a line are split
fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut len = 0;
        for word in paragraph.split_whitespace() {
            let word_len = word.chars().count();
            if len > 0 && len + 1 + word_len > width {
                lines.push(std::mem::take(&mut line));
                len = 0;
            }
            if len > 0 {
                line.push(' ');
                len += 1;
            }
            for c in word.chars() {
                if len >= width {
                    lines.push(std::mem::take(&mut line));
                    len = 0;
                }
                line.push(c);
                len += 1;
            }
        }
        lines.push(line);
    }
    lines
}

// ============================================================================
// Splash
// ============================================================================

fn render_splash(frame: &mut Frame, area: Rect) {
    let white = Style::default().fg(Color::White);
    let lines = vec![
        Line::default(),
        Line::from(Span::styled("🛡  CBMPE", white.bold())),
        Line::from(Span::styled("Corpo de Bombeiros", white)),
        Line::from(Span::styled("Pernambuco", Style::default().fg(Color::Gray))),
        Line::default(),
        Line::from(Span::styled("Assistente Virtual", Style::default().fg(Color::Gray))),
        Line::from(Span::styled("Emissão de Certificados", white)),
        Line::default(),
        Line::from(Span::styled(
            "[ Iniciar Atendimento ]",
            Style::default().fg(BRAND).bg(Color::White).bold(),
        )),
        Line::from(Span::styled(
            "Atendimento automatizado 24h",
            Style::default().fg(Color::Gray),
        )),
        Line::default(),
        Line::from(Span::styled(
            "Enter para começar · q para sair",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let [_, body, _] = Layout::vertical([
        Constraint::Fill(1),
        Constraint::Length(u16::try_from(lines.len()).unwrap_or(u16::MAX)),
        Constraint::Fill(1),
    ])
    .areas(area);

    frame.render_widget(Block::default().style(Style::default().bg(BRAND)), area);
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), body);
}

// ============================================================================
// Login
// ============================================================================

fn render_login(app: &App, frame: &mut Frame, area: Rect) {
    let view = &app.login;
    let [header, title, email, password, forgot, submit, divider, gov_br, register, _] =
        Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(4),
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .areas(area);

    render_header(
        frame,
        header,
        "CBMPE Digital",
        "Corpo de Bombeiros de Pernambuco",
        "Tab navegar · F2 mostrar senha · Esc voltar ",
    );
    frame.render_widget(
        Paragraph::new(vec![
            Line::default(),
            Line::from(" Entrar".bold()),
            Line::from(Span::styled(" Acesse sua conta", Style::default().fg(Color::Gray))),
        ]),
        title,
    );

    let focus = view.focus;
    render_field(
        frame,
        email,
        "Email",
        &view.email,
        "seu@email.com",
        focus.is(LoginItem::Email),
        view.errors.get(Field::Email),
    );
    render_field(
        frame,
        password,
        "Senha",
        &view.password,
        "••••••••",
        focus.is(LoginItem::Password),
        view.errors.get(Field::Password),
    );
    render_link(frame, forgot, "", "Esqueci minha senha", focus.is(LoginItem::ForgotPassword));
    render_button(
        frame,
        submit,
        busy_or(app, &[AuthRequest::Login], "Entrar"),
        focus.is(LoginItem::Submit),
    );
    frame.render_widget(
        Paragraph::new(Span::styled("ou", Style::default().fg(Color::DarkGray)))
            .alignment(Alignment::Center),
        divider,
    );
    render_button(
        frame,
        gov_br,
        busy_or(app, &[AuthRequest::GovBrLogin], "Entrar com Gov.br"),
        focus.is(LoginItem::GovBr),
    );
    render_link(
        frame,
        register,
        "Não tem uma conta? ",
        "Cadastre-se",
        focus.is(LoginItem::Register),
    );
}

// ============================================================================
// Register
// ============================================================================

fn render_register(app: &App, frame: &mut Frame, area: Rect) {
    let view = &app.register;
    let focus = view.focus;
    let [header, body] =
        Layout::vertical([Constraint::Length(2), Constraint::Min(0)]).areas(area);
    render_header(
        frame,
        header,
        "Criar Conta",
        "Preencha seus dados",
        "Tab navegar · Espaço marcar · Esc voltar ",
    );

    // Two columns of fields so the form fits a regular terminal
    let [rows, terms, submit, login, _] = Layout::vertical([
        Constraint::Length(12),
        Constraint::Length(2),
        Constraint::Length(2),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(body);
    let [left, right] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)]).areas(rows);
    let [name, cpf, email] = Layout::vertical([Constraint::Length(4); 3]).areas(left);
    let [phone, password, confirm] = Layout::vertical([Constraint::Length(4); 3]).areas(right);

    let fields = [
        (name, "Nome Completo", &view.name, "João Silva Santos", RegisterItem::Name, Field::Name),
        (cpf, "CPF", &view.cpf, "000.000.000-00", RegisterItem::Cpf, Field::Cpf),
        (email, "Email", &view.email, "seu@email.com", RegisterItem::Email, Field::Email),
        (phone, "Telefone", &view.phone, "(81) 98765-4321", RegisterItem::Phone, Field::Phone),
        (password, "Senha", &view.password, "••••••••", RegisterItem::Password, Field::Password),
        (
            confirm,
            "Confirmar Senha",
            &view.confirm_password,
            "••••••••",
            RegisterItem::ConfirmPassword,
            Field::ConfirmPassword,
        ),
    ];
    for (area, label, input, placeholder, item, field) in fields {
        render_field(
            frame,
            area,
            label,
            input,
            placeholder,
            focus.is(item),
            view.errors.get(field),
        );
    }

    let checkbox = if view.accepted_terms { "[x]" } else { "[ ]" };
    let mut terms_style = Style::default();
    if focus.is(RegisterItem::Terms) {
        terms_style = terms_style.fg(Color::Yellow).bold();
    }
    let mut terms_lines = vec![Line::from(vec![
        Span::styled(format!(" {checkbox} "), terms_style),
        Span::raw("Aceito os "),
        Span::styled("termos de uso", Style::default().fg(Color::LightRed)),
        Span::raw(" e a "),
        Span::styled("política de privacidade", Style::default().fg(Color::LightRed)),
    ])];
    if let Some(message) = view.errors.get(Field::Terms) {
        terms_lines.push(Line::from(Span::styled(
            format!(" ⚠ {message}"),
            Style::default().fg(Color::LightRed),
        )));
    }
    frame.render_widget(Paragraph::new(terms_lines), terms);

    render_button(
        frame,
        submit,
        busy_or(app, &[AuthRequest::Register], "Criar Conta"),
        focus.is(RegisterItem::Submit),
    );
    render_link(frame, login, "Já tem uma conta? ", "Entrar", focus.is(RegisterItem::Login));
}

// ============================================================================
// Forgot password
// ============================================================================

fn render_forgot_password(app: &App, frame: &mut Frame, area: Rect) {
    let view = &app.forgot;
    if view.sent {
        render_reset_sent(app, frame, area);
        return;
    }

    let [header, intro, email, submit, back, _] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(5),
        Constraint::Length(4),
        Constraint::Length(2),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(area);

    render_header(
        frame,
        header,
        "Redefinir Senha",
        "Recupere seu acesso",
        "Tab navegar · Esc voltar ",
    );
    let intro_text = Text::from(vec![
        Line::default(),
        Line::from(" Esqueceu sua senha?".bold()),
        Line::from(Span::styled(
            " Digite seu email cadastrado e enviaremos um link para redefinir sua senha.",
            Style::default().fg(Color::Gray),
        )),
    ]);
    frame.render_widget(
        Paragraph::new(intro_text).wrap(ratatui::widgets::Wrap { trim: false }),
        intro,
    );

    render_field(
        frame,
        email,
        "Email",
        &view.email,
        "seu@email.com",
        view.focus.is(ForgotItem::Email),
        view.error,
    );
    render_button(
        frame,
        submit,
        busy_or(app, &[AuthRequest::SendResetLink], "Enviar Link de Redefinição"),
        view.focus.is(ForgotItem::Submit),
    );
    render_link(
        frame,
        back,
        "",
        "Voltar ao login",
        view.focus.is(ForgotItem::BackToLogin),
    );
}

fn render_reset_sent(app: &App, frame: &mut Frame, area: Rect) {
    let view = &app.forgot;
    let [header, body, back, resend, _] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(9),
        Constraint::Length(2),
        Constraint::Length(1),
        Constraint::Min(0),
    ])
    .areas(area);

    render_header(frame, header, "Email Enviado", "", "Esc voltar ");
    let lines = vec![
        Line::default(),
        Line::from(Span::styled("✔", Style::default().fg(Color::Green).bold())),
        Line::from("Email enviado!".bold()),
        Line::from(Span::styled(
            "Enviamos um link de redefinição de senha para:",
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(
            view.email.value().to_string(),
            Style::default().fg(Color::LightRed),
        )),
        Line::default(),
        Line::from(Span::styled(
            "Verifique sua caixa de entrada e spam. O link expira em 1 hora.",
            Style::default().fg(Color::Gray),
        )),
    ];
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), body);

    render_button(
        frame,
        back,
        "Voltar ao Login",
        view.sent_focus.is(SentItem::BackToLogin),
    );
    render_link(
        frame,
        resend,
        "",
        busy_or(app, &[AuthRequest::ResendResetLink], "Não recebeu? Reenviar email"),
        view.sent_focus.is(SentItem::Resend),
    );
}

// ============================================================================
// Chat
// ============================================================================

fn message_lines(
    message: &Message,
    width: usize,
    active_options: Option<usize>,
) -> Vec<Line<'static>> {
    let bubble = (width * 85 / 100).max(10);
    let mut lines = Vec::new();
    let time = Span::styled(message.time_label(), Style::default().fg(Color::DarkGray));

    match message.origin {
        Origin::Bot => {
            lines.push(Line::from(Span::styled(
                "🛡 CBMPE Bot",
                Style::default().fg(Color::LightRed).bold(),
            )));
            for line in wrap(&message.text, bubble) {
                lines.push(Line::from(line));
            }
            if let Some(options) = &message.options {
                for (index, option) in options.iter().enumerate() {
                    let label = format!(" {}. {option} ", index + 1);
                    let style = match active_options {
                        Some(selected) if selected == index => {
                            Style::default().fg(Color::White).bg(BRAND).bold()
                        }
                        Some(_) => Style::default().fg(Color::White),
                        None => Style::default().fg(Color::DarkGray),
                    };
                    lines.push(Line::from(Span::styled(label, style)));
                }
            }
            lines.push(Line::from(time));
        }
        Origin::User => {
            let style = Style::default().fg(Color::White).bg(BRAND);
            for line in wrap(&message.text, bubble) {
                lines.push(
                    Line::from(Span::styled(format!(" {line} "), style)).alignment(Alignment::Right),
                );
            }
            lines.push(Line::from(time).alignment(Alignment::Right));
        }
        Origin::Error => {
            let style = Style::default().fg(Color::LightRed);
            for line in wrap(&format!("⚠ {}", message.text), bubble) {
                lines.push(Line::from(Span::styled(line, style)));
            }
            lines.push(Line::from(time));
        }
    }
    lines.push(Line::default());
    lines
}

fn render_chat(app: &App, frame: &mut Frame, area: Rect) {
    let view = &app.chat;
    let text_step = view.step.accepts_text();
    let error_height = u16::from(text_step && view.error.is_some());
    let footer_height = if text_step { 3 } else { 1 };

    let [header, messages_area, error_area, footer] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(0),
        Constraint::Length(error_height),
        Constraint::Length(footer_height),
    ])
    .areas(area);

    render_header(
        frame,
        header,
        "Assistente CBMPE",
        "Online",
        "Esc menu · Ctrl+X sair · PgUp/PgDn rolar ",
    );

    // Options are live only on the latest bot prompt
    let active_id = view.options().and_then(|_| {
        view.messages
            .iter()
            .rev()
            .find(|m| m.origin == Origin::Bot)
            .map(|m| m.id)
    });

    let width = messages_area.width.saturating_sub(2) as usize;
    let mut lines: Vec<Line> = Vec::new();
    for message in &view.messages {
        let active = (Some(message.id) == active_id).then_some(view.selected_option);
        lines.extend(message_lines(message, width, active));
    }
    if view.typing {
        lines.push(Line::from(Span::styled(
            "🛡 CBMPE Bot",
            Style::default().fg(Color::LightRed).bold(),
        )));
        let dots = ["●", "● ●", "● ● ●"][usize::from(app.animation_frame % 3)];
        lines.push(Line::from(Span::styled(dots, Style::default().fg(BRAND))));
    }

    let visible = messages_area.height as usize;
    let top = lines
        .len()
        .saturating_sub(visible)
        .saturating_sub(usize::from(view.scroll));
    let chat = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::RIGHT)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .scroll((u16::try_from(top).unwrap_or(u16::MAX), 0));
    frame.render_widget(chat, messages_area);

    if let Some(error) = view.error.as_deref().filter(|_| text_step) {
        let line = Span::styled(format!(" ⚠ {error}"), Style::default().fg(Color::LightRed));
        frame.render_widget(Paragraph::new(line), error_area);
    }

    if text_step {
        // The validator message sits above the input, not below
        render_field(
            frame,
            footer,
            "Mensagem (Enter envia)",
            &view.input,
            view.placeholder(),
            true,
            None,
        );
    } else {
        let hint = if view.typing {
            "Aguarde..."
        } else {
            "↑/↓ escolher · Enter confirmar · 1-9 atalho"
        };
        frame.render_widget(
            Paragraph::new(Span::styled(hint, Style::default().fg(Color::DarkGray)))
                .alignment(Alignment::Center),
            footer,
        );
    }
}

// ============================================================================
// Menu
// ============================================================================

fn render_menu(app: &App, frame: &mut Frame, area: Rect) {
    let [header, grid, notice, emergency, footer, _] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(12),
        Constraint::Length(1),
        Constraint::Length(5),
        Constraint::Length(2),
        Constraint::Min(0),
    ])
    .areas(area);

    render_header(
        frame,
        header,
        "Menu",
        "Corpo de Bombeiros de Pernambuco",
        "Setas escolher · Enter abrir · Esc voltar ",
    );

    let rows = MENU_ENTRIES.len().div_ceil(MenuView::COLUMNS);
    let row_areas = Layout::vertical(vec![Constraint::Length(4); rows]).split(grid);
    for (row, row_area) in row_areas.iter().enumerate() {
        let cells =
            Layout::horizontal(vec![Constraint::Fill(1); MenuView::COLUMNS]).split(*row_area);
        for (col, cell) in cells.iter().enumerate() {
            let index = row * MenuView::COLUMNS + col;
            let Some(entry) = MENU_ENTRIES.get(index) else {
                continue;
            };
            let selected = index == app.menu.selected;
            let border = if selected { Color::Yellow } else { Color::DarkGray };
            let tile = Paragraph::new(vec![
                Line::from(entry.title.bold()),
                Line::from(Span::styled(entry.description, Style::default().fg(Color::Gray))),
            ])
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(border)),
            );
            frame.render_widget(tile, *cell);
        }
    }

    if let Some(message) = app.menu.notice {
        frame.render_widget(
            Paragraph::new(Span::styled(message, Style::default().fg(Color::Yellow)))
                .alignment(Alignment::Center),
            notice,
        );
    }

    let white = Style::default().fg(Color::White);
    let emergency_box = Paragraph::new(vec![
        Line::from(Span::styled("Emergência", white.bold())),
        Line::from(Span::styled(EMERGENCY_NUMBER, white.bold())),
        Line::from(Span::styled(
            "Disque em caso de incêndio ou emergência",
            Style::default().fg(Color::Gray),
        )),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(BRAND)))
    .style(Style::default().bg(BRAND));
    frame.render_widget(emergency_box, emergency);

    let dim = Style::default().fg(Color::DarkGray);
    frame.render_widget(
        Paragraph::new(vec![
            Line::from(Span::styled("CBMPE - Corpo de Bombeiros Militar de Pernambuco", dim)),
            Line::from(Span::styled(
                format!("Versão {}", env!("CARGO_PKG_VERSION")),
                dim,
            )),
        ])
        .alignment(Alignment::Center),
        footer,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_breaks_on_words() {
        assert_eq!(
            wrap("Qual o tipo de edificação?", 12),
            vec!["Qual o tipo", "de", "edificação?"]
        );
    }

    #[test]
    fn test_wrap_keeps_blank_lines_and_splits_long_words() {
        assert_eq!(
            wrap("Olá\n\nCBMPE-0123456789", 6),
            vec!["Olá", "", "CBMPE-", "012345", "6789"]
        );
    }
}
