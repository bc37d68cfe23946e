//! Mappers between the nested internal profile model and the flat legacy DTO.
//!
//! Both directions are total: anything structurally invalid is rejected while
//! deserializing the DTO, before it ever reaches these functions.

use shared::LegacyProfile;

use crate::domain::models::{AlarmProfile, Cadence, TimeWindow};

pub struct ProfileMapper;

impl ProfileMapper {
    /// Flatten an internal profile for legacy consumers
    pub fn to_legacy(profile: &AlarmProfile, user_id: &str) -> LegacyProfile {
        LegacyProfile {
            user_id: user_id.to_string(),
            alarm_id: profile.profile_id.clone(),
            name: profile.title.clone(),
            video_url: profile.media_reference.clone(),
            frequency_per_day: profile.cadence.per_day,
            days_of_week: profile.cadence.weekdays.iter().copied().collect(),
            start_time: profile.cadence.window.start,
            end_time: profile.cadence.window.end,
            exact_time: profile.cadence.fixed_time,
            specific_dates: profile.cadence.dates.clone(),
            is_active: profile.is_active,
            created_at: profile.created_at,
            updated_at: profile.updated_at,
        }
    }

    /// Rebuild the internal profile from its legacy shape; the user id is dropped
    pub fn to_internal(legacy: LegacyProfile) -> AlarmProfile {
        AlarmProfile {
            profile_id: legacy.alarm_id,
            title: legacy.name,
            media_reference: legacy.video_url,
            cadence: Cadence {
                per_day: legacy.frequency_per_day,
                weekdays: legacy.days_of_week.into_iter().collect(),
                window: TimeWindow {
                    start: legacy.start_time,
                    end: legacy.end_time,
                },
                fixed_time: legacy.exact_time,
                dates: legacy.specific_dates,
            },
            is_active: legacy.is_active,
            created_at: legacy.created_at,
            updated_at: legacy.updated_at,
        }
    }

    pub fn to_legacy_list<'a>(
        profiles: impl IntoIterator<Item = &'a AlarmProfile>,
        user_id: &str,
    ) -> Vec<LegacyProfile> {
        profiles
            .into_iter()
            .map(|profile| Self::to_legacy(profile, user_id))
            .collect()
    }
}
