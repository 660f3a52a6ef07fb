use super::{
    PointMapper,
    BACKUP_OBJECTS_MEASUREMENT,
    HOST_TAG,
    INFO_MEASUREMENT,
    MANAGED_SERVERS_MEASUREMENT,
    PROXIES_MEASUREMENT,
};
use crate::{
    point::Point,
    veeam::models::{
        BackupObject,
        ManagedServer,
        Proxy,
        ServerInfo,
    },
};

impl PointMapper {
    pub fn server_info(&self, info: &ServerInfo) -> Point {
        Point::new(INFO_MEASUREMENT)
            .tag("veeamVBRId", &info.vbr_id)
            .tag("veeamVBRName", &info.name)
            .tag("veeamVBRVersion", &info.build_version)
            .tag(HOST_TAG, &self.host)
            .tag("veeamDatabaseVendor", &info.database_vendor)
            .field("vbr", 1i64)
    }

    /// The position of a server in the listing is written as its id; it is
    /// not stable across cycles.
    pub fn managed_servers(&self, servers: &[ManagedServer]) -> Vec<Point> {
        servers
            .iter()
            .enumerate()
            .map(|(index, server)| {
                Point::new(MANAGED_SERVERS_MEASUREMENT)
                    .tag(HOST_TAG, &self.host)
                    .tag("veeamVBRMSName", &server.name)
                    .tag("veeamVBRMStype", &server.kind)
                    .tag("veeamVBRMSDescription", server.description.as_deref().unwrap_or_default())
                    .field("veeamVBRMSInternalID", index as i64)
            })
            .collect()
    }

    pub fn proxies(&self, proxies: &[Proxy]) -> Vec<Point> {
        proxies
            .iter()
            .map(|proxy| {
                Point::new(PROXIES_MEASUREMENT)
                    .tag(HOST_TAG, &self.host)
                    .tag("veeamVBRProxyName", &proxy.name)
                    .tag("veeamVBRProxyType", &proxy.kind)
                    .tag("veeamVBRProxyDescription", proxy.description.as_deref().unwrap_or_default())
                    .tag("veeamVBRProxyMode", &proxy.server.transport_mode)
                    .field("veeamVBRProxyTask", proxy.server.max_task_count)
            })
            .collect()
    }

    pub fn backup_objects(&self, objects: &[BackupObject]) -> Vec<Point> {
        objects
            .iter()
            .map(|object| {
                Point::new(BACKUP_OBJECTS_MEASUREMENT)
                    .tag(HOST_TAG, &self.host)
                    .tag("veeamVBRBobjectName", &object.name)
                    .tag("veeamVBRBobjecttype", &object.kind)
                    .tag("veeamVBRBobjectPlatform", &object.platform_name)
                    .tag("veeamVBRBobjectviType", &object.vi_type)
                    .tag("veeamVBRBobjectObjectId", &object.object_id)
                    .tag("veeamVBRBobjectPath", &object.path)
                    .field("restorePointsCount", object.restore_points_count)
            })
            .collect()
    }
}
