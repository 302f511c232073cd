/// 为操作类型生成单次请求的超时设置方法。
///
/// 操作创建时会复制一份 [`InfluxClient`](`crate::InfluxClient`)，其中的超时时间来自
/// `ConnectionConfig` 的 `timeout_ms`（也就是 `INFLUXDB_TIMEOUT_MS`）。
/// 这里的设置只修改这份副本，所以只影响当前这一次请求。
/// 超时只在发送请求时应用一次，这里设置的值会完全替换客户端的配置值。
#[macro_export]
macro_rules! add_per_request_options {
    ($type_name:ty) => {
        impl $type_name {
            /// 针对此次操作设置超时时间，单位为毫秒，覆盖 `INFLUXDB_TIMEOUT_MS`
            pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
                self.client.options.timeout_ms = Some(timeout_ms);
                self
            }

            /// Same as [`Self::timeout_ms`]. Sub-millisecond parts are dropped.
            pub fn timeout(self, timeout: ::std::time::Duration) -> Self {
                let ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
                self.timeout_ms(ms)
            }

            /// 即使配置了 `INFLUXDB_TIMEOUT_MS`，此次操作也不设置超时，一直等到服务端响应
            pub fn no_timeout(mut self) -> Self {
                self.client.options.timeout_ms = None;
                self
            }
        }
    };
}
