use super::version::TimelineLayout;

/// Windows XP and Server 2003 keep only the last run time
pub(crate) fn timeline_layout() -> TimelineLayout {
    TimelineLayout {
        run_times_offset: 36,
        run_time_slots: 1,
        run_count_offset: 60,
    }
}
