use burn::{
    nn::{
        attention::{MhaInput, MultiHeadAttention, MultiHeadAttentionConfig},
        loss::CrossEntropyLossConfig,
        Dropout, DropoutConfig,
        Embedding, EmbeddingConfig,
        LayerNorm, LayerNormConfig,
        Linear, LinearConfig,
    },
    prelude::*,
};

// Each scalar feature becomes one token:
//   token_j = value_projection(x_j) + feature_embedding(j)
// The token sequence runs through `num_layers` encoder blocks,
// is mean-pooled over features, and projected to class logits.
//
// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize.
#[derive(Config, Debug)]
pub struct TabularAttentionConfig {
    pub n_features: usize,
    pub n_classes:  usize,
    pub d_model:    usize,
    pub num_heads:  usize,
    pub num_layers: usize,
    pub d_ff:       usize,
    pub dropout:    f64,
}

impl TabularAttentionConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> TabularAttentionModel<B> {
        let value_projection  = LinearConfig::new(1, self.d_model).init(device);
        let feature_embedding = EmbeddingConfig::new(self.n_features, self.d_model).init(device);
        let layers: Vec<EncoderBlock<B>> = (0..self.num_layers)
            .map(|_| self.build_encoder_block(device))
            .collect();
        let final_norm = LayerNormConfig::new(self.d_model).init(device);
        let classifier = LinearConfig::new(self.d_model, self.n_classes).init(device);
        let dropout    = DropoutConfig::new(self.dropout).init();
        TabularAttentionModel {
            value_projection, feature_embedding, layers,
            final_norm, classifier, dropout,
        }
    }

    fn build_encoder_block<B: Backend>(&self, device: &B::Device) -> EncoderBlock<B> {
        let self_attn   = MultiHeadAttentionConfig::new(self.d_model, self.num_heads)
            .with_dropout(self.dropout)
            .init(device);
        let ffn_linear1 = LinearConfig::new(self.d_model, self.d_ff).init(device);
        let ffn_linear2 = LinearConfig::new(self.d_ff, self.d_model).init(device);
        let norm1   = LayerNormConfig::new(self.d_model).init(device);
        let norm2   = LayerNormConfig::new(self.d_model).init(device);
        let dropout = DropoutConfig::new(self.dropout).init();
        EncoderBlock { self_attn, ffn_linear1, ffn_linear2, norm1, norm2, dropout }
    }
}

/// Post-norm transformer encoder layer: attention and a GELU
/// feed-forward network, each wrapped in residual + LayerNorm.
#[derive(Module, Debug)]
pub struct EncoderBlock<B: Backend> {
    pub self_attn:   MultiHeadAttention<B>,
    pub ffn_linear1: Linear<B>,
    pub ffn_linear2: Linear<B>,
    pub norm1:       LayerNorm<B>,
    pub norm2:       LayerNorm<B>,
    pub dropout:     Dropout,
}

impl<B: Backend> EncoderBlock<B> {
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 3> {
        let attn_output = self.self_attn.forward(MhaInput::self_attn(x.clone())).context;
        let x = self.norm1.forward(x + self.dropout.forward(attn_output));
        let ffn_out = self.ffn_linear2.forward(
            burn::tensor::activation::gelu(self.ffn_linear1.forward(x.clone()))
        );
        self.norm2.forward(x + self.dropout.forward(ffn_out))
    }
}

#[derive(Module, Debug)]
pub struct TabularAttentionModel<B: Backend> {
    pub value_projection:  Linear<B>,
    pub feature_embedding: Embedding<B>,
    pub layers:            Vec<EncoderBlock<B>>,
    pub final_norm:        LayerNorm<B>,
    pub classifier:        Linear<B>,
    pub dropout:           Dropout,
}

impl<B: Backend> TabularAttentionModel<B> {
    /// features: [batch, n_features] → logits: [batch, n_classes]
    pub fn forward(&self, features: Tensor<B, 2>) -> Tensor<B, 2> {
        let [batch_size, n_features] = features.dims();
        let device = features.device();

        let values = self.value_projection.forward(features.reshape([batch_size, n_features, 1]));

        // Attention is permutation-invariant, so feature identity is injected explicitly.
        let positions = Tensor::<B, 1, Int>::arange(0..n_features as i64, &device)
            .unsqueeze::<2>()
            .expand([batch_size, n_features]);
        let feature_emb = self.feature_embedding.forward(positions);

        let mut x = self.dropout.forward(values + feature_emb);
        for layer in &self.layers {
            x = layer.forward(x);
        }
        let x = self.final_norm.forward(x); // [batch, n_features, d_model]

        let [_, _, d_model] = x.dims();
        let pooled = x.mean_dim(1).reshape([batch_size, d_model]);
        self.classifier.forward(pooled)
    }

    /// Mean cross-entropy over the batch, plus the logits.
    pub fn forward_loss(
        &self,
        features: Tensor<B, 2>,
        targets:  Tensor<B, 1, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 2>) {
        let logits = self.forward(features);
        let loss = CrossEntropyLossConfig::new()
            .init(&logits.device())
            .forward(logits.clone(), targets);
        (loss, logits)
    }

    /// Argmax class index per row, shape [batch]
    pub fn predict_classes(&self, features: Tensor<B, 2>) -> Tensor<B, 1, Int> {
        // argmax(1) returns [batch, 1]
        self.forward(features).argmax(1).flatten::<1>(0, 1)
    }
}
