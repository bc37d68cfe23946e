use shared::NotificationScheduleDto;

use crate::domain::models::NotificationSchedule;

pub struct ScheduleMapper;

impl ScheduleMapper {
    pub fn to_dto(schedule: &NotificationSchedule) -> NotificationScheduleDto {
        NotificationScheduleDto {
            active_profile_id: schedule.active_profile_id.clone(),
            morning_time: schedule.morning_time,
            evening_time: schedule.evening_time,
            timezone: schedule.timezone.clone(),
            is_enabled: schedule.is_enabled,
            updated_at: schedule.updated_at,
        }
    }
}
