use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, Screen};

#[derive(Debug, Clone, Copy)]
pub(crate) enum Action {
    None,
    Quit,
    /// Run `service.fetch`(...) for the source under the cursor
    OpenSchedule,
    /// Run `service.fetch`(...) again for the selected source
    Refresh,
}

pub(crate) fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    use KeyCode::{Char, Down, Enter, Esc, Left, Right, Up};

    // Global quit shortcuts
    if key.code == Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }
    if key.code == Char('q') && key.modifiers.is_empty() {
        return Action::Quit;
    }

    let mut action = Action::None;

    match app.screen {
        Screen::SourceSelect => match key.code {
            Up | Char('k') => {
                if app.source_list_index > 0 {
                    app.source_list_index -= 1;
                }
            }
            Down | Char('j') => {
                if app.source_list_index + 1 < app.sources.len() {
                    app.source_list_index += 1;
                }
            }
            Enter | Right | Char(' ') => {
                action = Action::OpenSchedule;
            }
            _ => {}
        },

        Screen::ScheduleView => match key.code {
            Left | Esc | Char('b') => {
                app.screen = Screen::SourceSelect;
                app.error_message = None;
            }
            Char('r') => {
                action = Action::Refresh;
            }
            _ => {}
        },
    }
    action
}
