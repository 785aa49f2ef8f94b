//! 双路径兼容性演示
//!
//! 构造一个示例事件，分别走原生路径与适配器路径，打印序列化
//! 哈希与文本渲染，并确认两条路径输出逐字节一致。

use protoflex_compat::sample::{PeerInfo, SyncEvent};
use protoflex_compat::{CompatConfig, CompatRunner};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CompatConfig::default().load_with_env_override()?;
    println!("{}", config.summary());

    let mut event = SyncEvent::beat(42, 7);
    event.urgent = true;
    event.payload = b"state".to_vec();
    event.source = Some(PeerInfo {
        peer_id: 9,
        nickname: b"flint".to_vec(),
    });
    event.ack_list = vec![1, 2, 3];

    let runner = CompatRunner::with_config(config)?;
    let report = runner.verify(&event)?;

    println!("序列化字节数: {}", report.serialized_len);
    if let Some(hash) = &report.content_hash {
        println!("SHA-256: {}", hash);
    }
    if let Some(text) = &report.rendering {
        println!("文本: {}", text);
    }

    Ok(())
}
