//! Canned answer source standing in for the real analytics backend. Replies
//! arrive asynchronously over the app event channel after a short simulated
//! latency, so the chat flow behaves like a remote assistant without one.

use crate::event::AppEvent;
use crate::pins::generator::{self, Bucket};
use std::sync::mpsc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time;

const REPLY_DELAY: Duration = Duration::from_millis(600);

#[derive(Clone)]
pub struct Assistant {
    runtime: Handle,
    tx: mpsc::Sender<AppEvent>,
}

impl Assistant {
    pub fn new(runtime: Handle, tx: mpsc::Sender<AppEvent>) -> Self {
        Self { runtime, tx }
    }

    /// Answer a question. The reply event carries the original query plus
    /// the category it resolved to, which is what a pin needs later.
    pub fn ask(&self, query: String) {
        let tx = self.tx.clone();
        self.runtime.spawn(async move {
            time::sleep(REPLY_DELAY).await;
            let bucket = generator::classify("", &query);
            let reply = AppEvent::AssistantReply {
                category: bucket.label().to_string(),
                response: canned_response(bucket).to_string(),
                query,
            };
            let _ = tx.send(reply);
        });
    }
}

fn canned_response(bucket: Bucket) -> &'static str {
    match bucket {
        Bucket::Operations => {
            "本月营业收入12.8亿元，同比增长8.3%；净利润4.2亿元，成本收入比31.5%，\
             净息差1.92%。盈利能力保持稳健，费用管控好于年度预算进度。"
        }
        Bucket::Deposits => {
            "存款余额858亿元，较上月增长2.1%。其中对公存款512亿元，活期占比38.2%，\
             储蓄存款增势良好。建议关注大额存单到期续接情况，避免月末集中流出。"
        }
        Bucket::Loans => {
            "当前不良贷款率为1.35%，较上季度下降0.04个百分点。贷款余额642亿元，\
             本月新增投放18.5亿元，拨备覆盖率保持在180%以上，整体资产质量稳定可控。"
        }
        Bucket::Intermediate => {
            "中间业务收入2.35亿元，手续费收入1860万元，同比增长12.4%。\
             代理及托管类业务贡献提升明显，银行卡类收入基本持平。"
        }
        Bucket::Customers => {
            "客户总数86.3万户，本月新增3200户，活跃率62%。VIP客户4150户，\
             贡献了约35%的营业收入；年轻客群占比持续上升，线上渠道渗透率提高。"
        }
        Bucket::General => {
            "已收到您的问题。当前各业务系统运行正常，您可以询问经营、存款、贷款、\
             中间业务或客户相关的指标，我会给出对应的分析摘要。"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn responses_track_the_classifier_buckets() {
        let bucket = generator::classify("", "本月不良贷款率是多少？");
        assert_eq!(bucket, Bucket::Loans);
        assert!(canned_response(bucket).contains("不良贷款率"));

        let fallback = generator::classify("", "你好");
        assert_eq!(fallback, Bucket::General);
        assert!(canned_response(fallback).contains("正常"));
    }
}
