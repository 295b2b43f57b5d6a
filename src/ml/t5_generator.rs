// ============================================================
// Layer 5 — T5 Question Generator
// ============================================================
// Runs a pretrained T5 question-generation model with candle.
//
// One `generate` call = one prompt → RETURN_SEQUENCES candidates:
//   - sequence 0 is a greedy decode
//   - the others are temperature-sampled with distinct seeds
// The encoder runs once per prompt; each decode clears the KV cache
// when it finishes.

use std::sync::Mutex;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::generation::LogitsProcessor;
use candle_transformers::models::t5::{self, T5ForConditionalGeneration};
use tokenizers::Tokenizer;

use crate::domain::error::{GenerationError, QgenError, QgenResult};
use crate::domain::traits::Generator;
use crate::infra::model_store::{ModelFiles, WeightsFile};
use crate::ml::catalog::ModelSpec;

/// num_return_sequences
const RETURN_SEQUENCES:    usize = 3;
const SAMPLING_TEMPERATURE: f64  = 0.8;
const SAMPLING_TOP_P:       f64  = 0.95;
const BASE_SEED:            u64  = 42;

pub struct T5Generator {
    model:      Mutex<T5ForConditionalGeneration>,
    tokenizer:  Tokenizer,
    config:     t5::Config,
    device:     Device,
    model_id:   String,
    max_length: usize,
}

impl T5Generator {
    /// Load a model from resolved files. Any failure is fatal to the run.
    pub fn load(spec: &ModelSpec, files: &ModelFiles, max_length: usize) -> QgenResult<Self> {
        let unavailable = |reason: String| QgenError::ModelUnavailable {
            model: spec.id.to_string(),
            reason,
        };
        let device = Device::Cpu;

        tracing::info!("Loading model {} on {:?}...", spec.id, device);

        let raw = std::fs::read_to_string(&files.config)
            .map_err(|e| unavailable(format!("read config: {e}")))?;
        let mut config: t5::Config = serde_json::from_str(&raw)
            .map_err(|e| unavailable(format!("parse config: {e}")))?;
        config.use_cache = true;

        let tokenizer = Tokenizer::from_file(&files.tokenizer)
            .map_err(|e| unavailable(format!("tokenizer: {e}")))?;

        let vb = match &files.weights {
            // SAFETY: safetensors files are memory-mapped read-only
            WeightsFile::SafeTensors(path) => unsafe {
                VarBuilder::from_mmaped_safetensors(&[path], DType::F32, &device)
            },
            WeightsFile::PyTorch(path) => VarBuilder::from_pth(path, DType::F32, &device),
        }
        .map_err(|e| unavailable(format!("weights: {e}")))?;

        let model = T5ForConditionalGeneration::load(vb, &config)
            .map_err(|e| unavailable(format!("model: {e}")))?;

        tracing::info!("Model {} loaded", spec.id);

        Ok(Self {
            model: Mutex::new(model),
            tokenizer,
            config,
            device,
            model_id: spec.id.to_string(),
            max_length: max_length.max(1),
        })
    }

    fn decode_one(
        &self,
        model:          &mut T5ForConditionalGeneration,
        encoder_output: &Tensor,
        mut sampler:    LogitsProcessor,
    ) -> Result<String, GenerationError> {
        let start = self
            .config
            .decoder_start_token_id
            .unwrap_or(self.config.pad_token_id) as u32;
        let mut tokens = vec![start];

        for step in 0..self.max_length {
            let input = if step == 0 {
                Tensor::new(tokens.as_slice(), &self.device)
            } else {
                Tensor::new(&tokens[tokens.len() - 1..], &self.device)
            }
            .and_then(|t| t.unsqueeze(0))
            .map_err(inference)?;

            let logits = model
                .decode(&input, encoder_output)
                .and_then(|l| l.squeeze(0))
                .and_then(|l| l.to_dtype(DType::F32))
                .map_err(inference)?;

            let next = sampler.sample(&logits).map_err(inference)?;
            if next as usize == self.config.eos_token_id {
                break;
            }
            tokens.push(next);
        }
        model.clear_kv_cache();

        self.tokenizer
            .decode(&tokens[1..], true)
            .map(|s| s.trim().to_string())
            .map_err(|e| GenerationError::Tokenize(e.to_string()))
    }
}

fn inference(e: candle_core::Error) -> GenerationError {
    GenerationError::Inference(e.to_string())
}

impl Generator for T5Generator {
    fn generate(&self, prompt: &str) -> Result<Vec<String>, GenerationError> {
        let encoding = self
            .tokenizer
            .encode(prompt, true)
            .map_err(|e| GenerationError::Tokenize(e.to_string()))?;

        let input = Tensor::new(encoding.get_ids(), &self.device)
            .and_then(|t| t.unsqueeze(0))
            .map_err(inference)?;

        let mut model = self
            .model
            .lock()
            .map_err(|e| GenerationError::Unavailable(e.to_string()))?;

        model.clear_kv_cache();
        let encoder_output = model.encode(&input).map_err(inference)?;

        let mut outputs = Vec::with_capacity(RETURN_SEQUENCES);
        for i in 0..RETURN_SEQUENCES {
            let sampler = if i == 0 {
                LogitsProcessor::new(BASE_SEED, None, None)
            } else {
                LogitsProcessor::new(
                    BASE_SEED + i as u64,
                    Some(SAMPLING_TEMPERATURE),
                    Some(SAMPLING_TOP_P),
                )
            };
            outputs.push(self.decode_one(&mut model, &encoder_output, sampler)?);
        }

        tracing::debug!("Generated {} sequences for prompt of {} tokens", outputs.len(), encoding.len());
        Ok(outputs)
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}
