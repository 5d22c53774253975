//! Long-living masternode quorum types.

use std::fmt::{Display, Formatter};

/// The LLMQ type a quorum was formed as. Values match Dash Core's `Consensus::LLMQType`.
#[repr(u8)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub enum LLMQType {
    LlmqtypeUnknown = 0, // other kind of
    Llmqtype50_60 = 1,   // 50 members,  30  (60%) threshold, 24 / day
    Llmqtype400_60 = 2,  // 400 members, 240 (60%) threshold, 2  / day
    Llmqtype400_85 = 3,  // 400 members, 340 (85%) threshold, 1  / day
    Llmqtype100_67 = 4,  // 100 members, 67  (67%) threshold, 24 / day
    Llmqtype60_75 = 5,   // 60 members,  45  (75%) threshold, 2  / day
    Llmqtype25_67 = 6,   // 25 members,  17  (67%) threshold, 24 / day

    // dev-only
    LlmqtypeTest = 100,
    LlmqtypeDevnet = 101,
    LlmqtypeTestV17 = 102,
    LlmqtypeTestDIP0024 = 103,
    LlmqtypeTestInstantSend = 104,
}

impl Display for LLMQType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            LLMQType::LlmqtypeUnknown => "0_Unknown",
            LLMQType::Llmqtype50_60 => "1_50/60",
            LLMQType::Llmqtype400_60 => "2_400/60",
            LLMQType::Llmqtype400_85 => "3_400/85",
            LLMQType::Llmqtype100_67 => "4_100/67",
            LLMQType::Llmqtype60_75 => "5_60/75",
            LLMQType::Llmqtype25_67 => "6_25/67",
            LLMQType::LlmqtypeTest => "100_Test",
            LLMQType::LlmqtypeDevnet => "101_Dev",
            LLMQType::LlmqtypeTestV17 => "102_Test-v17",
            LLMQType::LlmqtypeTestDIP0024 => "103_Test-dip-24",
            LLMQType::LlmqtypeTestInstantSend => "104_Test-IS",
        })
    }
}

impl From<u8> for LLMQType {
    fn from(orig: u8) -> Self {
        match orig {
            1 => LLMQType::Llmqtype50_60,
            2 => LLMQType::Llmqtype400_60,
            3 => LLMQType::Llmqtype400_85,
            4 => LLMQType::Llmqtype100_67,
            5 => LLMQType::Llmqtype60_75,
            6 => LLMQType::Llmqtype25_67,
            100 => LLMQType::LlmqtypeTest,
            101 => LLMQType::LlmqtypeDevnet,
            102 => LLMQType::LlmqtypeTestV17,
            103 => LLMQType::LlmqtypeTestDIP0024,
            104 => LLMQType::LlmqtypeTestInstantSend,
            _ => LLMQType::LlmqtypeUnknown,
        }
    }
}

impl From<LLMQType> for u8 {
    fn from(value: LLMQType) -> Self {
        value as u8
    }
}
