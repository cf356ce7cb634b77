//! CNN Model Architecture for CIFAR-10 Classification
//!
//! A VGG-style network for 32x32 RGB input: three double-convolution blocks
//! followed by a small fully connected head producing ten class scores.

use burn::{
    config::Config,
    module::Module,
    nn::{
        conv::{Conv2d, Conv2dConfig},
        pool::{MaxPool2d, MaxPool2dConfig},
        BatchNorm, BatchNormConfig, Dropout, DropoutConfig, Linear, LinearConfig, PaddingConfig2d,
        Relu,
    },
    tensor::{backend::Backend, Tensor},
};

use crate::{IMAGE_SIZE, NUM_CHANNELS, NUM_CLASSES};

/// Configuration for the Cifar10Cnn model
#[derive(Config, Debug)]
pub struct Cifar10CnnConfig {
    /// Number of output classes
    #[config(default = "10")]
    pub num_classes: usize,

    /// Input image size (assumes square images)
    #[config(default = "32")]
    pub input_size: usize,

    /// Number of input channels (3 for RGB)
    #[config(default = "3")]
    pub in_channels: usize,

    /// Filters in the first block; doubled for each following block
    #[config(default = "32")]
    pub base_filters: usize,

    /// Units in the hidden dense layer
    #[config(default = "128")]
    pub hidden_units: usize,

    /// Dropout rate before the output layer
    #[config(default = "0.5")]
    pub dropout_rate: f64,
}

impl Cifar10CnnConfig {
    /// Number of features entering the dense head after three 2x2 poolings
    pub fn flattened_features(&self) -> usize {
        let spatial = self.input_size / 8;
        spatial * spatial * self.base_filters * 4
    }

    /// Check the config against the fixed preprocessing and label set
    pub fn validate(&self) -> Result<(), String> {
        if self.input_size != IMAGE_SIZE {
            return Err(format!(
                "input_size must be {} (got {})",
                IMAGE_SIZE, self.input_size
            ));
        }

        if self.in_channels != NUM_CHANNELS {
            return Err(format!(
                "in_channels must be {} (got {})",
                NUM_CHANNELS, self.in_channels
            ));
        }

        if self.num_classes != NUM_CLASSES {
            return Err(format!(
                "num_classes must be {} (got {})",
                NUM_CLASSES, self.num_classes
            ));
        }

        if self.dropout_rate < 0.0 || self.dropout_rate >= 1.0 {
            return Err("dropout_rate must be in range [0.0, 1.0)".to_string());
        }

        Ok(())
    }

    /// Initialize a model with random weights
    pub fn init<B: Backend>(&self, device: &B::Device) -> Cifar10Cnn<B> {
        Cifar10Cnn::new(self, device)
    }
}

/// Two 3x3 convolutions with batch norm and ReLU, then 2x2 max pooling
#[derive(Module, Debug)]
pub struct ConvBlock<B: Backend> {
    pub conv_a: Conv2d<B>,
    pub bn_a: BatchNorm<B, 2>,
    pub conv_b: Conv2d<B>,
    pub bn_b: BatchNorm<B, 2>,
    pub relu: Relu,
    pub pool: MaxPool2d,
}

impl<B: Backend> ConvBlock<B> {
    pub fn new(in_channels: usize, out_channels: usize, device: &B::Device) -> Self {
        let conv_a = Conv2dConfig::new([in_channels, out_channels], [3, 3])
            .with_padding(PaddingConfig2d::Same)
            .init(device);
        let conv_b = Conv2dConfig::new([out_channels, out_channels], [3, 3])
            .with_padding(PaddingConfig2d::Same)
            .init(device);

        Self {
            conv_a,
            bn_a: BatchNormConfig::new(out_channels).init(device),
            conv_b,
            bn_b: BatchNormConfig::new(out_channels).init(device),
            relu: Relu::new(),
            pool: MaxPool2dConfig::new([2, 2]).with_strides([2, 2]).init(),
        }
    }

    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 4> {
        let x = self.relu.forward(self.bn_a.forward(self.conv_a.forward(x)));
        let x = self.relu.forward(self.bn_b.forward(self.conv_b.forward(x)));
        self.pool.forward(x)
    }
}

/// CIFAR-10 classifier CNN
///
/// Architecture:
/// - 3 convolutional blocks (32 -> 64 -> 128 filters), each halving the resolution
/// - Flatten (4 x 4 x 128)
/// - Dense -> ReLU -> Dropout -> Dense (10)
#[derive(Module, Debug)]
pub struct Cifar10Cnn<B: Backend> {
    pub block1: ConvBlock<B>,
    pub block2: ConvBlock<B>,
    pub block3: ConvBlock<B>,
    pub fc1: Linear<B>,
    pub dropout: Dropout,
    pub fc2: Linear<B>,
    num_classes: usize,
}

impl<B: Backend> Cifar10Cnn<B> {
    /// Create a new model from configuration
    pub fn new(config: &Cifar10CnnConfig, device: &B::Device) -> Self {
        let base = config.base_filters;

        Self {
            block1: ConvBlock::new(config.in_channels, base, device), // 32 -> 16
            block2: ConvBlock::new(base, base * 2, device),           // 16 -> 8
            block3: ConvBlock::new(base * 2, base * 4, device),       // 8 -> 4
            fc1: LinearConfig::new(config.flattened_features(), config.hidden_units).init(device),
            dropout: DropoutConfig::new(config.dropout_rate).init(),
            fc2: LinearConfig::new(config.hidden_units, config.num_classes).init(device),
            num_classes: config.num_classes,
        }
    }

    /// Forward pass through the network
    ///
    /// # Arguments
    /// * `x` - Input tensor of shape [batch_size, channels, height, width]
    ///
    /// # Returns
    /// * Logits tensor of shape [batch_size, num_classes]
    pub fn forward(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = self.block1.forward(x);
        let x = self.block2.forward(x);
        let x = self.block3.forward(x);

        let [batch_size, channels, height, width] = x.dims();
        let x = x.reshape([batch_size, channels * height * width]);

        let x = self.fc1.forward(x);
        let x = Relu::new().forward(x);
        let x = self.dropout.forward(x);
        self.fc2.forward(x)
    }

    /// Forward pass with softmax for inference
    pub fn forward_softmax(&self, x: Tensor<B, 4>) -> Tensor<B, 2> {
        burn::tensor::activation::softmax(self.forward(x), 1)
    }

    /// Get the number of output classes
    pub fn num_classes(&self) -> usize {
        self.num_classes
    }
}
