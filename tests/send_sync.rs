//! Send/Sync guarantees for core types.

use std::sync::Arc;

use http_log_writer::{
    ChannelCache, FallbackChannel, HttpChannel, HttpWriter, HttpWriterBuilder, Replacer,
    StreamChannel, StreamWriter, StreamWriterBuilder, WriterChannel, WriterOpener,
    WriterRegistry,
};
use rstest::rstest;
use static_assertions::{assert_impl_all, assert_obj_safe};

assert_obj_safe!(WriterChannel, WriterOpener);

#[rstest]
fn builders_are_send_sync() {
    assert_impl_all!(HttpWriterBuilder: Send, Sync, Clone);
    assert_impl_all!(StreamWriterBuilder: Send, Sync, Copy);
    assert_impl_all!(Replacer: Send, Sync);
    assert_impl_all!(WriterRegistry: Send, Sync);
}

#[rstest]
fn writers_are_send_sync() {
    assert_impl_all!(HttpWriter: Send, Sync, Clone);
    assert_impl_all!(StreamWriter: Send, Sync);
    assert_impl_all!(Arc<dyn WriterOpener>: Send, Sync);
}

#[rstest]
fn channels_are_send_sync() {
    assert_impl_all!(HttpChannel: Send, Sync);
    assert_impl_all!(StreamChannel: Send, Sync);
    assert_impl_all!(FallbackChannel: Send, Sync);
    assert_impl_all!(ChannelCache: Send, Sync);
    assert_impl_all!(Arc<dyn WriterChannel>: Send, Sync);
}
