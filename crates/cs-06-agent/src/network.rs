//! # Q-Network
//!
//! Small dense network trained one sample at a time, built on `burn` with the
//! ndarray backend.
//!
//! ```text
//! input (width*height) ─▶ [linear+relu] × hidden ─▶ linear ─▶ ACTIONS
//! ```
//!
//! Weights use variance-scaling (fan-in) uniform initialisation drawn from the
//! caller's RNG, so a seed fixes the starting model. Biases start at zero.
//! Training minimises mean squared error with Adam.

use crate::errors::AgentError;
use burn::backend::Autodiff;
use burn::module::Param;
use burn::nn::loss::{MseLoss, Reduction};
use burn::nn::{Initializer, Linear, LinearConfig, Relu};
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::prelude::*;
use burn::LearningRate;
use burn_ndarray::{NdArray, NdArrayDevice};
use parking_lot::{Mutex, RwLock};
use rand::Rng;
use shared_types::{PredictionVector, StateGrid};
use std::sync::Arc;

/// Model shared by the training loop and the peer-answering oracle.
pub type SharedModel = Arc<RwLock<QNetwork>>;

type Train = Autodiff<NdArray<f32>>;

const BETA1: f32 = 0.9;
const BETA2: f32 = 0.999;
const ADAM_EPSILON: f32 = 1e-7;

#[derive(Module, Debug)]
struct Mlp<B: Backend> {
    hidden: Vec<Linear<B>>,
    output: Linear<B>,
    activation: Relu,
}

impl<B: Backend> Mlp<B> {
    fn forward(&self, x: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = self
            .hidden
            .iter()
            .fold(x, |x, layer| self.activation.forward(layer.forward(x)));
        self.output.forward(x)
    }
}

fn dense<R: Rng + ?Sized>(
    inputs: usize,
    outputs: usize,
    device: &NdArrayDevice,
    rng: &mut R,
) -> Linear<Train> {
    let limit = (3.0 / inputs.max(1) as f32).sqrt();
    let weights: Vec<f32> = (0..inputs * outputs)
        .map(|_| rng.gen_range(-limit..=limit))
        .collect();

    let mut layer = LinearConfig::new(inputs, outputs)
        .with_initializer(Initializer::Zeros)
        .init(device);
    let weights = Tensor::from_data(TensorData::new(weights, [inputs, outputs]), device);
    layer.weight = Param::from_tensor(weights.require_grad());
    layer
}

/// Optimizer step over the concrete model type.
trait Step: Send {
    fn step(
        &mut self,
        lr: LearningRate,
        model: Mlp<Train>,
        grads: GradientsParams,
    ) -> Mlp<Train>;
}

impl<O> Step for O
where
    O: Optimizer<Mlp<Train>, Train> + Send,
{
    fn step(
        &mut self,
        lr: LearningRate,
        model: Mlp<Train>,
        grads: GradientsParams,
    ) -> Mlp<Train> {
        Optimizer::step(self, lr, model, grads)
    }
}

struct Learner {
    model: Mlp<Train>,
    optimizer: Box<dyn Step>,
}

/// Fully connected action-value network.
pub struct QNetwork {
    learner: Mutex<Learner>,
    inputs: usize,
    outputs: usize,
    learning_rate: f32,
    device: NdArrayDevice,
}

impl QNetwork {
    /// Build a network `inputs → hidden[0] → … → outputs`.
    pub fn new<R: Rng + ?Sized>(
        inputs: usize,
        hidden: &[usize],
        outputs: usize,
        learning_rate: f32,
        rng: &mut R,
    ) -> Self {
        let device = NdArrayDevice::default();
        let mut fan_in = inputs;
        let mut layers = Vec::with_capacity(hidden.len());
        for &units in hidden {
            layers.push(dense(fan_in, units, &device, rng));
            fan_in = units;
        }
        let model = Mlp {
            hidden: layers,
            output: dense(fan_in, outputs, &device, rng),
            activation: Relu::new(),
        };
        let optimizer = AdamConfig::new()
            .with_beta_1(BETA1)
            .with_beta_2(BETA2)
            .with_epsilon(ADAM_EPSILON)
            .init::<Train, Mlp<Train>>();

        Self {
            learner: Mutex::new(Learner {
                model,
                optimizer: Box::new(optimizer),
            }),
            inputs,
            outputs,
            learning_rate,
            device,
        }
    }

    #[must_use]
    pub fn input_len(&self) -> usize {
        self.inputs
    }

    #[must_use]
    pub fn output_len(&self) -> usize {
        self.outputs
    }

    /// Action-values for a raw input vector.
    pub fn forward(&self, input: &[f32]) -> Result<Vec<f32>, AgentError> {
        check_len(self.inputs, input)?;
        let output = self.learner.lock().model.forward(self.row(input));
        output
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| AgentError::Tensor(format!("{e:?}")))
    }

    /// Action-values for a grid observation.
    pub fn predict(&self, state: &StateGrid) -> Result<PredictionVector, AgentError> {
        self.forward(&state.flatten()).map(PredictionVector::new)
    }

    /// One Adam step towards `target`. Returns the loss before the step.
    pub fn train(&mut self, input: &[f32], target: &[f32]) -> Result<f32, AgentError> {
        check_len(self.inputs, input)?;
        check_len(self.outputs, target)?;

        let input = self.row(input);
        let target = self.row(target);
        let learner = self.learner.get_mut();

        let output = learner.model.forward(input);
        let loss = MseLoss::new().forward(output, target, Reduction::Mean);
        let value = loss.clone().into_scalar();

        let grads = GradientsParams::from_grads(loss.backward(), &learner.model);
        learner.model = learner.optimizer.step(
            LearningRate::from(self.learning_rate),
            learner.model.clone(),
            grads,
        );
        Ok(value)
    }

    fn row(&self, values: &[f32]) -> Tensor<Train, 2> {
        Tensor::from_data(
            TensorData::new(values.to_vec(), [1, values.len()]),
            &self.device,
        )
    }
}

fn check_len(expected: usize, values: &[f32]) -> Result<(), AgentError> {
    if values.len() == expected {
        Ok(())
    } else {
        Err(AgentError::ShapeMismatch {
            expected,
            actual: values.len(),
        })
    }
}
