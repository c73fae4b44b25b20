use super::version::TimelineLayout;

/// Windows Vista and 7. The run count directly follows the eight run time slots
pub(crate) fn timeline_layout() -> TimelineLayout {
    TimelineLayout {
        run_times_offset: 44,
        run_time_slots: 8,
        run_count_offset: 108,
    }
}
