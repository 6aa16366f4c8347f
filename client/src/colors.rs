// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::collections::HashMap;
use std::sync::Arc;

use lazy_static::lazy_static;
use parking_lot::RwLock;
use ratatui::style::Color;

// Struct to hold the user color map
pub struct UserColorMap {
    colors: HashMap<String, Color>,
    palette: Arc<Vec<Color>>,
    next_color_index: usize,
}

impl Default for UserColorMap {
    fn default() -> Self {
        Self {
            colors: HashMap::new(),
            // A palette of distinct terminal colors that stay readable on
            // both dark and light backgrounds.
            palette: Arc::new(vec![
                Color::Cyan,
                Color::Magenta,
                Color::Green,
                Color::Yellow,
                Color::Blue,
                Color::LightRed,
                Color::LightCyan,
                Color::LightMagenta,
                Color::LightGreen,
                Color::LightYellow,
                Color::LightBlue,
                Color::Gray,
            ]),
            next_color_index: 0,
        }
    }
}

lazy_static! {
    // This is the global, lazily initialized, thread-safe user color map.
    // Assignments live only for the session; the avatar colors carry no
    // meaning the backend needs to know about.
    static ref USER_COLORS: Arc<RwLock<UserColorMap>> =
        Arc::new(RwLock::new(UserColorMap::default()));
}

/// Function to get or assign a stable color to a username for the
/// duration of the session.
pub fn get_or_assign_user_color(username: &str) -> Color {
    let mut user_colors = USER_COLORS.write(); // Acquire a write lock
    assign_color_to_user(&mut user_colors, username)
}

/// Core assignment logic, kept separate from the global map so it can be
/// exercised on an isolated instance.
fn assign_color_to_user(map: &mut UserColorMap, username: &str) -> Color {
    // Check if the user already has an assigned color
    if let Some(color) = map.colors.get(username) {
        return *color;
    }

    // If not, assign the next color from the palette
    let color_to_assign = map.palette[map.next_color_index];
    map.colors.insert(username.to_string(), color_to_assign);

    // Move to the next color in the palette, wrapping around if necessary
    map.next_color_index = (map.next_color_index + 1) % map.palette.len();

    color_to_assign
}
