use super::version::TimelineLayout;

/// Version 30 has been seen with two variants. The short one has its file metrics at offset 296
const SHORT_VARIANT: u32 = 296;

/// Windows 10 and 11. The metrics offset decides where the run count is
pub(crate) fn timeline_layout(file_metrics_offset: u32) -> TimelineLayout {
    let run_count_offset = if file_metrics_offset == SHORT_VARIANT {
        116
    } else {
        124
    };

    TimelineLayout {
        run_times_offset: 44,
        run_time_slots: 8,
        run_count_offset,
    }
}
