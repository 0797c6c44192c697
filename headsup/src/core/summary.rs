const MILLIS_PER_MINUTE: u64 = 60 * 1000;
const MILLIS_PER_SECOND: u64 = 1000;

pub fn snooze_summary(millis: u64) -> String {
    if millis == 0 {
        "snooze disabled".to_string()
    } else {
        format!("snoozed for {} minutes", millis / MILLIS_PER_MINUTE)
    }
}

pub fn decay_summary(millis: u64) -> String {
    if millis == 0 {
        "never decays".to_string()
    } else {
        format!("decays after {} seconds", millis / MILLIS_PER_SECOND)
    }
}
