//! Protoflex 性能基准测试
//!
//! 测试适配层各条路径的性能指标。

#![cfg(feature = "benchmark")]

use bytes::BytesMut;
use protoflex_adapter::Adapter;
use protoflex_compat::sample::{PeerInfo, SyncEvent};
use protoflex_core::LegacyMessage;
use protoflex_reflect::{format_compact, MarshalOptions, MessageView};

/// 基准测试辅助宏
macro_rules! bench {
    ($name:expr, $code:block) => {
        let start = std::time::Instant::now();
        let iterations = 10000;
        for _ in 0..iterations {
            $code
        }
        let duration = start.elapsed();
        let avg_ns = duration.as_nanos() / iterations as u128;
        println!("  {:30}: {:>8} ns/op ({} ops in {:?})",
            $name, avg_ns, iterations, duration);
    };
}

fn sample_event() -> SyncEvent {
    let mut event = SyncEvent::beat(42, 7);
    event.payload = b"benchmark".to_vec();
    event.source = Some(PeerInfo {
        peer_id: 9,
        nickname: b"bench".to_vec(),
    });
    event.ack_list = vec![1, 2, 3, 4];
    event
}

fn main() {
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("   Protoflex 性能基准测试");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");

    bench_native_marshal();
    bench_bridge_marshal();
    bench_descriptor_resolution();
    bench_range_walk();
    bench_text_render();

    println!("\n━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("   基准测试完成");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}

/// 测试原生路径序列化性能
fn bench_native_marshal() {
    println!("\n📊 原生路径基准测试:");
    let event = sample_event();

    bench!("marshal_to_sized_buffer", {
        let mut buf = vec![0u8; event.encoded_size()];
        let _ = event.marshal_to_sized_buffer(&mut buf);
    });
}

/// 测试适配器快速路径性能
fn bench_bridge_marshal() {
    println!("\n📊 适配器快速路径基准测试:");
    let event = sample_event();
    let adapter = Adapter::new(&event);

    bench!("marshal", {
        let _ = adapter.marshal(&MarshalOptions::default(), BytesMut::new());
    });
}

/// 测试描述符解析性能（每次全新适配器，无缓存）
fn bench_descriptor_resolution() {
    println!("\n📊 描述符解析基准测试:");
    let event = sample_event();

    bench!("descriptor() 冷启动", {
        let adapter = Adapter::new(&event);
        let _ = adapter.descriptor();
    });

    let warm = Adapter::new(&event);
    let _ = warm.descriptor();
    bench!("descriptor() 缓存命中", {
        let _ = warm.descriptor();
    });
}

/// 测试逐字段遍历性能
fn bench_range_walk() {
    println!("\n📊 逐字段遍历基准测试:");
    let event = sample_event();
    let adapter = Adapter::new(&event);
    let _ = adapter.descriptor();

    bench!("range", {
        let mut count = 0;
        let _ = adapter.range(&mut |_, _| {
            count += 1;
            true
        });
        let _ = count;
    });
}

/// 测试文本渲染性能
fn bench_text_render() {
    println!("\n📊 文本渲染基准测试:");
    let event = sample_event();
    let adapter = Adapter::new(&event);

    bench!("format_compact", {
        let _ = format_compact(&adapter);
    });
}
