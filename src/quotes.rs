use chrono::{DateTime, TimeZone};

pub const QUOTES: [&str; 15] = [
    "The groundwork for all happiness is good health. (Leigh Hunt)",
    "Success isn't always about greatness. It's about consistency. (Dwayne Johnson)",
    "The body achieves what the mind believes. (Napoleon Hill)",
    "Take care of your body. It's the only place you have to live. (Jim Rohn)",
    "Exercise is a celebration of what your body can do. Not a punishment for what you ate.",
    "Your only limit is you. Push past it.",
    "Strength doesn't come from what you can do. It comes from overcoming the things you once thought you couldn't.",
    "Fitness is not about being better than someone else. It's about being better than you used to be.",
    "Don't wish for a good body, work for it.",
    "Champions train, losers complain.",
    "No pain, no gain. Shut up and train.",
    "Fall seven times, stand up eight. (Japanese Proverb)",
    "If you want something you've never had, you must be willing to do something you've never done.",
    "The only bad workout is the one that didn't happen.",
    "Discipline is choosing between what you want now and what you want most.",
];

/// Seconds each quote stays up before the next one.
pub const ROTATE_SECS: i64 = 8;

pub fn quote_at(index: usize) -> &'static str {
    QUOTES[index % QUOTES.len()]
}

/// Quote showing at `now` in the fixed rotation.
pub fn quote_for<Tz: TimeZone>(now: &DateTime<Tz>) -> &'static str {
    let slot = now.timestamp().div_euclid(ROTATE_SECS);
    quote_at(slot.rem_euclid(QUOTES.len() as i64) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn rotation_wraps() {
        assert_eq!(quote_at(0), QUOTES[0]);
        assert_eq!(quote_at(15), QUOTES[0]);

        let t = Utc.timestamp_opt(8 * 16, 0).unwrap();
        assert_eq!(quote_for(&t), QUOTES[1]);
        let same_slot = Utc.timestamp_opt(8 * 16 + 7, 0).unwrap();
        assert_eq!(quote_for(&same_slot), QUOTES[1]);
    }
}
