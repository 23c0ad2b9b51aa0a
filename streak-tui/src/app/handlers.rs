use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::app::state::{App, AuthView, DeleteTarget, FriendsFocus, Modal, ProfileForm, PROFILE_FIELDS};
use crate::log_key_event;
use crate::router::Page;

pub fn handle_key_event(app: &mut App, key: KeyEvent) -> Result<()> {
    if key.kind != KeyEventKind::Press {
        return Ok(());
    }
    log_key_event!(app.log_config, "key={:?} page={:?}", key.code, app.current_page());

    // Ctrl+C always quits
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.running = false;
        return Ok(());
    }

    // Priority 1: modal overlays
    if let Some(modal) = app.modal.take() {
        app.modal = handle_modal_keys(app, modal, key);
        return Ok(());
    }

    // Priority 2: post composer
    if app.composer.open {
        handle_composer_keys(app, key);
        return Ok(());
    }

    // Priority 3: public profile overlay
    if app.public_profile.is_some() {
        handle_public_profile_keys(app, key);
        return Ok(());
    }

    // The auth forms and the friend search capture plain characters
    if app.current_page() == Page::Auth {
        return handle_auth_keys(app, key);
    }
    if app.current_page() == Page::Friends && app.friends_state.focus == FriendsFocus::Search {
        handle_search_keys(app, key);
        return Ok(());
    }

    // Priority 4: global keys
    match key.code {
        KeyCode::Char('?') => {
            app.toggle_help();
            return Ok(());
        }
        KeyCode::Char('q') | KeyCode::Char('Q') => {
            app.running = false;
            return Ok(());
        }
        KeyCode::Char('t') | KeyCode::Char('T') => {
            app.toggle_theme();
            return Ok(());
        }
        KeyCode::Char('L') => {
            app.logout();
            return Ok(());
        }
        KeyCode::Tab => {
            app.next_tab();
            return Ok(());
        }
        KeyCode::BackTab => {
            app.previous_tab();
            return Ok(());
        }
        KeyCode::Char(c) if c.is_ascii_digit() => {
            if let Some(page) = c.to_digit(10).and_then(Page::from_number) {
                app.navigate(page);
            }
            return Ok(());
        }
        KeyCode::Esc => {
            app.toasts.dismiss_latest();
            return Ok(());
        }
        _ => {}
    }

    match app.current_page() {
        Page::Auth => {}
        Page::Home => handle_home_keys(app, key),
        Page::Feed => handle_feed_keys(app, key),
        Page::Habits => handle_habits_keys(app, key),
        Page::Stats => handle_stats_keys(app, key),
        Page::Friends => handle_friends_keys(app, key),
        Page::Profile => handle_profile_keys(app, key),
    }
    Ok(())
}

/// Applies `key` to the open modal and returns the modal that stays open, if any.
fn handle_modal_keys(app: &mut App, modal: Modal, key: KeyEvent) -> Option<Modal> {
    match modal {
        Modal::Help => match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?') | KeyCode::Char('q') => None,
            _ => Some(Modal::Help),
        },
        Modal::Alert { title, message } => match key.code {
            KeyCode::Esc | KeyCode::Enter => None,
            _ => Some(Modal::Alert { title, message }),
        },
        Modal::AddHabit { mut name } => match key.code {
            KeyCode::Esc => None,
            KeyCode::Enter => {
                // closed by the success event so a failed request keeps the input
                app.add_habit(&name);
                Some(Modal::AddHabit { name })
            }
            KeyCode::Backspace => {
                name.pop();
                Some(Modal::AddHabit { name })
            }
            KeyCode::Char(c) => {
                name.push(c);
                Some(Modal::AddHabit { name })
            }
            _ => Some(Modal::AddHabit { name }),
        },
        Modal::MarkToday { habit_id, habit_name } => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.mark_today(habit_id, true);
                None
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Char('s') | KeyCode::Char('S') => {
                app.mark_today(habit_id, false);
                None
            }
            KeyCode::Esc => None,
            _ => Some(Modal::MarkToday { habit_id, habit_name }),
        },
        Modal::EditProfile(mut form) => match key.code {
            KeyCode::Esc => None,
            KeyCode::Enter => {
                app.save_profile(&form);
                Some(Modal::EditProfile(form))
            }
            KeyCode::Tab | KeyCode::Down => {
                form.focus = (form.focus + 1) % PROFILE_FIELDS.len();
                Some(Modal::EditProfile(form))
            }
            KeyCode::BackTab | KeyCode::Up => {
                form.focus = (form.focus + PROFILE_FIELDS.len() - 1) % PROFILE_FIELDS.len();
                Some(Modal::EditProfile(form))
            }
            KeyCode::Backspace => {
                form.focused_field_mut().pop();
                Some(Modal::EditProfile(form))
            }
            KeyCode::Char(c) => {
                form.focused_field_mut().push(c);
                Some(Modal::EditProfile(form))
            }
            _ => Some(Modal::EditProfile(form)),
        },
        Modal::Visibility { mut is_public, mut bio } => match key.code {
            KeyCode::Esc => None,
            KeyCode::Enter => {
                app.save_visibility(is_public, &bio);
                Some(Modal::Visibility { is_public, bio })
            }
            KeyCode::Tab => {
                is_public = !is_public;
                Some(Modal::Visibility { is_public, bio })
            }
            KeyCode::Backspace => {
                bio.pop();
                Some(Modal::Visibility { is_public, bio })
            }
            KeyCode::Char(c) => {
                bio.push(c);
                Some(Modal::Visibility { is_public, bio })
            }
            _ => Some(Modal::Visibility { is_public, bio }),
        },
        Modal::Comment { post_id } => {
            let Some(thread) = app.feed.thread_mut(post_id) else {
                return None;
            };
            match key.code {
                KeyCode::Esc => None,
                KeyCode::Enter => {
                    app.submit_comment(post_id);
                    None
                }
                KeyCode::Backspace => {
                    thread.input.pop();
                    Some(Modal::Comment { post_id })
                }
                KeyCode::Char(c) => {
                    thread.input.push(c);
                    Some(Modal::Comment { post_id })
                }
                _ => Some(Modal::Comment { post_id }),
            }
        }
        Modal::ConfirmDelete(target) => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                match target {
                    DeleteTarget::Habit { id, .. } => app.delete_habit(id),
                    DeleteTarget::Post { id } => app.delete_post(id),
                }
                None
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => None,
            _ => Some(Modal::ConfirmDelete(target)),
        },
    }
}

fn handle_composer_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_composer(),
        KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => app.submit_post(),
        KeyCode::Tab => app.composer.visibility = app.composer.visibility.toggled(),
        _ => {
            if !app.composer.submitting {
                app.composer.textarea.input(key);
            }
        }
    }
}

fn handle_public_profile_keys(app: &mut App, key: KeyEvent) {
    let Some(overlay) = app.public_profile.as_mut() else {
        return;
    };
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.close_public_profile(),
        KeyCode::Down | KeyCode::Char('j') => {
            if overlay.scroll + 1 < overlay.posts.len() {
                overlay.scroll += 1;
            }
        }
        KeyCode::Up | KeyCode::Char('k') => overlay.scroll = overlay.scroll.saturating_sub(1),
        _ => {}
    }
}

fn handle_auth_keys(app: &mut App, key: KeyEvent) -> Result<()> {
    let state = &mut app.auth_state;
    match key.code {
        KeyCode::Esc => app.running = false,
        KeyCode::F(2) => {
            let view = match state.view {
                AuthView::Login => AuthView::Signup,
                AuthView::Signup => AuthView::Login,
            };
            state.set_view(view);
        }
        KeyCode::Tab | KeyCode::Down => state.focus_next(),
        KeyCode::BackTab | KeyCode::Up => state.focus_previous(),
        KeyCode::Enter => match state.view {
            AuthView::Login => app.submit_login(),
            AuthView::Signup => app.submit_signup(),
        },
        KeyCode::Backspace => {
            state.focused_field_mut().pop();
        }
        KeyCode::Char(c) => state.focused_field_mut().push(c),
        _ => {}
    }
    Ok(())
}

fn handle_home_keys(app: &mut App, key: KeyEvent) {
    let carousel = &mut app.home_state.carousel;
    match key.code {
        KeyCode::Left | KeyCode::Char('h') => carousel.cursor_left(),
        KeyCode::Right | KeyCode::Char('l') => carousel.cursor_right(),
        KeyCode::Char('[') => carousel.prev(),
        KeyCode::Char(']') => carousel.next(),
        KeyCode::Char('a') | KeyCode::Enter => {
            if let Some(candidate) = carousel.selected().cloned() {
                app.add_friend(&candidate);
            }
        }
        KeyCode::Char('p') => {
            if let Some(candidate) = carousel.selected().cloned() {
                app.open_public_profile(&candidate.username);
            }
        }
        KeyCode::Char('w') => app.cycle_rank_window(),
        KeyCode::Char('r') => app.load_home(),
        _ => {}
    }
}

fn handle_feed_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => {
            let at_end = app.feed.selected + 1 >= app.feed.posts().len();
            app.feed.select_next();
            if at_end {
                app.load_more_feed();
            }
        }
        KeyCode::Up | KeyCode::Char('k') => app.feed.select_previous(),
        KeyCode::Char('m') => {
            app.load_more_feed();
        }
        KeyCode::Char('n') => app.open_composer(),
        KeyCode::Char('r') => {
            app.load_feed(true);
        }
        _ => {
            let Some(post) = app.feed.selected_post() else {
                return;
            };
            let (post_id, author_id, username) = (post.id, post.author_id, post.username.clone());
            match key.code {
                KeyCode::Char('l') | KeyCode::Char(' ') => app.toggle_like(post_id),
                KeyCode::Char('c') | KeyCode::Enter => app.toggle_comments(post_id),
                KeyCode::Char('i') => app.open_comment_input(post_id),
                KeyCode::Char('p') if !username.is_empty() => app.open_public_profile(&username),
                KeyCode::Char('d') if Some(author_id) == app.user_id() => {
                    app.modal = Some(Modal::ConfirmDelete(DeleteTarget::Post { id: post_id }));
                }
                _ => {}
            }
        }
    }
}

fn handle_habits_keys(app: &mut App, key: KeyEvent) {
    let state = &mut app.habits_state;
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => {
            if state.selected + 1 < state.habits.len() {
                state.selected += 1;
            }
        }
        KeyCode::Up | KeyCode::Char('k') => state.selected = state.selected.saturating_sub(1),
        KeyCode::Char('a') => app.modal = Some(Modal::AddHabit { name: String::new() }),
        KeyCode::Enter | KeyCode::Char('m') => {
            if let Some(habit) = state.selected_habit() {
                app.modal = Some(Modal::MarkToday {
                    habit_id: habit.id,
                    habit_name: habit.name.clone(),
                });
            }
        }
        KeyCode::Char('d') => {
            if let Some(habit) = state.selected_habit() {
                app.modal = Some(Modal::ConfirmDelete(DeleteTarget::Habit {
                    id: habit.id,
                    name: habit.name.clone(),
                }));
            }
        }
        KeyCode::Char('r') => app.load_habits(),
        _ => {}
    }
}

fn handle_stats_keys(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('r') {
        app.load_stats();
    }
}

fn handle_friends_keys(app: &mut App, key: KeyEvent) {
    let state = &mut app.friends_state;
    match key.code {
        KeyCode::Char('/') | KeyCode::Char('s') => state.focus = FriendsFocus::Search,
        KeyCode::Down | KeyCode::Char('j') => {
            if state.selected + 1 < state.friends.len() {
                state.selected += 1;
            }
        }
        KeyCode::Up | KeyCode::Char('k') => state.selected = state.selected.saturating_sub(1),
        KeyCode::Char('x') | KeyCode::Char('d') => {
            if let Some(friend) = state.friends.get(state.selected).cloned() {
                app.remove_friend(&friend);
            }
        }
        KeyCode::Char('p') | KeyCode::Enter => {
            if let Some(friend) = state.friends.get(state.selected).cloned() {
                app.open_public_profile(&friend.username);
            }
        }
        KeyCode::Char('r') => app.load_friends(),
        _ => {}
    }
}

fn handle_search_keys(app: &mut App, key: KeyEvent) {
    let state = &mut app.friends_state;
    match key.code {
        KeyCode::Esc | KeyCode::Tab => state.focus = FriendsFocus::List,
        KeyCode::Down => {
            if state.result_selected + 1 < state.results.len() {
                state.result_selected += 1;
            }
        }
        KeyCode::Up => state.result_selected = state.result_selected.saturating_sub(1),
        KeyCode::Enter => {
            if let Some(candidate) = state.results.get(state.result_selected).cloned() {
                if !state.is_friend(candidate.id) {
                    app.add_friend(&candidate);
                }
            }
        }
        KeyCode::Backspace => {
            state.query.pop();
            app.search_changed();
        }
        KeyCode::Char(c) => {
            state.query.push(c);
            app.search_changed();
        }
        _ => {}
    }
}

fn handle_profile_keys(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('e') => {
            app.modal = Some(Modal::EditProfile(ProfileForm::from_profile(app.profile.as_ref())));
        }
        KeyCode::Char('v') => {
            let profile = app.profile.clone().unwrap_or_default();
            app.modal = Some(Modal::Visibility {
                is_public: profile.is_public(),
                bio: profile.bio.unwrap_or_default(),
            });
        }
        KeyCode::Char('n') => app.open_composer(),
        KeyCode::Down | KeyCode::Char('j') => {
            let state = &mut app.profile_state;
            if state.selected + 1 < state.posts.len() {
                state.selected += 1;
            }
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.profile_state.selected = app.profile_state.selected.saturating_sub(1);
        }
        KeyCode::Char('d') => {
            if let Some(post) = app.profile_state.posts.get(app.profile_state.selected) {
                app.modal = Some(Modal::ConfirmDelete(DeleteTarget::Post { id: post.id }));
            }
        }
        KeyCode::Char('r') => app.load_profile(),
        _ => {}
    }
}
