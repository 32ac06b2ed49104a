//! Display formatting shared by the renderers.

/// Separator placed between custom effect names.
pub const EFFECT_SEPARATOR: &str = " • ";

/// Format a hit-point value: integral values without decimals, others with one.
fn format_points(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{:.1}", v)
    }
}

/// Format current/maximum hit points, using `?` for a missing side.
///
/// # Examples
/// ```
/// use fray_types::formatting::format_hp;
/// assert_eq!(format_hp(Some(12.0), Some(40.0)), "12/40");
/// assert_eq!(format_hp(Some(12.0), None), "12/?");
/// assert_eq!(format_hp(None, Some(40.0)), "?/40");
/// assert_eq!(format_hp(None, None), "");
/// ```
pub fn format_hp(hp: Option<f64>, max_hp: Option<f64>) -> String {
    match (hp, max_hp) {
        (None, None) => String::new(),
        (hp, max) => format!(
            "{}/{}",
            hp.map(format_points).unwrap_or_else(|| "?".to_string()),
            max.map(format_points).unwrap_or_else(|| "?".to_string())
        ),
    }
}

/// Join custom effect names into a single label.
///
/// # Examples
/// ```
/// use fray_types::formatting::join_effects;
/// assert_eq!(join_effects(&["Blessed".to_string(), "Poisoned".to_string()]), "Blessed • Poisoned");
/// assert_eq!(join_effects(&[]), "");
/// ```
pub fn join_effects(names: &[String]) -> String {
    names.join(EFFECT_SEPARATOR)
}

/// Format the round counter, empty before the first round.
pub fn format_round(round: u32) -> String {
    if round == 0 {
        String::new()
    } else {
        format!("Round {}", round)
    }
}
