use super::version::TimelineLayout;

/// Windows 8, 8.1 and Server 2012
pub(crate) fn timeline_layout() -> TimelineLayout {
    TimelineLayout {
        run_times_offset: 44,
        run_time_slots: 8,
        run_count_offset: 124,
    }
}
