use super::*;

pub(super) fn handle_key(app: &mut App, key: KeyEvent) {
    if app.controller.state() == SyncState::Locked {
        app.controller.unlock();
    }
    if app.controller.is_busy() {
        if key.code == KeyCode::Esc {
            app.quit = true;
        }
        return;
    }

    let field = app.login.focused();
    match key.code {
        KeyCode::Esc => app.quit = true,
        KeyCode::Tab | KeyCode::Down => app.login.next(),
        KeyCode::BackTab | KeyCode::Up => app.login.prev(),
        KeyCode::Enter => match app.login.first_empty() {
            Some(idx) => app.login.focus = idx,
            None => app.submit_login(),
        },
        KeyCode::Left => app.login.get_mut(field).move_left(),
        KeyCode::Right => app.login.get_mut(field).move_right(),
        KeyCode::Home => app.login.get_mut(field).home(),
        KeyCode::End => app.login.get_mut(field).end(),
        KeyCode::Backspace => app.login.get_mut(field).backspace(),
        KeyCode::Delete => app.login.get_mut(field).delete(),
        KeyCode::Char(c) => {
            if key.modifiers.contains(KeyModifiers::CONTROL) {
                if c == 'u' {
                    app.login.get_mut(field).clear();
                }
                return;
            }
            app.login.get_mut(field).insert_char(c);
        }
        _ => {}
    }
}
