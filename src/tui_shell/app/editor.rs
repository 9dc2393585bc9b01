use super::*;

pub(super) fn handle_key(app: &mut App, key: KeyEvent) {
    if let Some(prompt) = app.prompt {
        handle_prompt_key(app, prompt, key);
        return;
    }
    if app.editing.is_some() {
        handle_edit_key(app, key);
        return;
    }

    let shift = key.modifiers.contains(KeyModifiers::SHIFT);
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,

        KeyCode::Up if shift => app.move_up(),
        KeyCode::Down if shift => app.move_down(),
        KeyCode::Char('K') => app.move_up(),
        KeyCode::Char('J') => app.move_down(),

        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Left | KeyCode::Char('h') | KeyCode::BackTab => app.field_prev(),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => app.field_next(),

        KeyCode::Enter | KeyCode::Char('e') => app.begin_edit(),
        KeyCode::Char('a') => app.add_row(),
        KeyCode::Char('d') | KeyCode::Delete => {
            if !app.rows.is_empty() {
                app.prompt = Some(Prompt::Delete(app.selected));
            }
        }
        KeyCode::Char('c') => app.cycle_background(),

        KeyCode::Char('s') => {
            if app.controller.is_busy() {
                app.notify(StatusKind::Error, SyncError::Busy.to_string());
            } else {
                app.prompt = Some(Prompt::Save);
            }
        }
        KeyCode::Char('r') => {
            if app.controller.is_busy() {
                app.notify(StatusKind::Error, SyncError::Busy.to_string());
            } else if app.has_unsaved_edits() {
                app.prompt = Some(Prompt::Reload);
            } else {
                app.start_load();
            }
        }
        KeyCode::Char('L') => app.prompt = Some(Prompt::Logout),
        _ => {}
    }
}

fn handle_prompt_key(app: &mut App, prompt: Prompt, key: KeyEvent) {
    app.prompt = None;
    if !matches!(key.code, KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter) {
        return;
    }
    match prompt {
        Prompt::Save => app.start_save(),
        Prompt::Delete(idx) => app.delete_row(idx),
        Prompt::Reload => app.start_load(),
        Prompt::Logout => app.logout(),
    }
}

fn handle_edit_key(app: &mut App, key: KeyEvent) {
    let Some(input) = app.editing.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Enter => app.commit_edit(),
        KeyCode::Tab => {
            app.commit_edit();
            app.field_next();
            app.begin_edit();
        }
        KeyCode::Esc => app.cancel_edit(),
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Home => input.home(),
        KeyCode::End => input.end(),
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            input.insert_char(c)
        }
        _ => {}
    }
}

/// Confirmation text for a pending prompt.
pub(super) fn question(app: &App, prompt: Prompt) -> String {
    match prompt {
        Prompt::Save => "Save these changes? This will update the live configuration.".to_string(),
        Prompt::Delete(idx) => {
            let label = app
                .rows
                .as_slice()
                .get(idx)
                .map(|r| r.label.trim())
                .filter(|l| !l.is_empty())
                .unwrap_or("this stage");
            format!("Remove {}?", label)
        }
        Prompt::Reload => "Discard unsaved changes and reload?".to_string(),
        Prompt::Logout => "Log out and forget the remembered repository?".to_string(),
    }
}
