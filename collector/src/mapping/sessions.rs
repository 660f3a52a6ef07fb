use super::{
    PointMapper,
    HOST_TAG,
    SESSIONS_MEASUREMENT,
};
use crate::{
    point::Point,
    veeam::models::{
        Session,
        SessionResult,
    },
};

impl PointMapper {
    /// One point per finished session whose type is not excluded. A session
    /// with neither a known result nor an end time has nothing to measure and
    /// is skipped.
    pub fn sessions(&self, sessions: &[Session]) -> Vec<Point> {
        sessions
            .iter()
            .filter(|session| self.keep_session(session))
            .filter_map(|session| self.session(session))
            .collect()
    }

    fn keep_session(&self, session: &Session) -> bool {
        if session.result.result == SessionResult::None {
            debug!(session_name = %session.name, "Skipping session with no data");
            return false;
        }

        if self.excluded_job_types.contains(&session.session_type) {
            debug!(
                session_name = %session.name,
                session_type = %session.session_type,
                "Skipping session with excluded job type"
            );
            return false;
        }

        true
    }

    fn session(&self, session: &Session) -> Option<Point> {
        let point = Point::new(SESSIONS_MEASUREMENT)
            .tag(HOST_TAG, &self.host)
            .tag("veeamVBRSessionJobName", &session.name)
            .tag("veeamVBRSessiontype", &session.session_type)
            .tag("veeamVBRSessionsJobState", &session.state)
            .tag(
                "veeamVBRSessionsJobResultMessage",
                session.result.message.as_deref().unwrap_or_default(),
            )
            .field_opt("veeamVBRSessionsJobResult", session.result.result.code())
            .field_opt("veeamBackupSessionsTimeDuration", session.duration_seconds());

        if point.fields.is_empty() {
            debug!(
                session_name = %session.name,
                result = ?session.result.result,
                "Skipping session without result code or duration"
            );
            return None;
        }

        Some(match session.end_time {
            Some(end_time) => point.timestamp(end_time),
            None => point,
        })
    }
}
