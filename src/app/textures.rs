use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{ColorImage, Context, TextureHandle, TextureOptions};
use tracing::warn;

use crate::graph::SocialGraph;

pub(super) struct AvatarTextures {
    rx: Option<Receiver<(String, ColorImage)>>,
    loaded: HashMap<String, TextureHandle>,
    expected: usize,
}

fn decode_avatar(path: &Path) -> Result<ColorImage, image::ImageError> {
    let rgba = image::open(path)?.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

impl AvatarTextures {
    pub(super) fn spawn(ctx: &Context, graph: &SocialGraph) -> Self {
        let jobs = graph
            .nodes
            .iter()
            .filter_map(|node| node.image.clone().map(|path| (node.id.clone(), path)))
            .collect::<Vec<(String, PathBuf)>>();
        let expected = jobs.len();

        let (tx, rx) = mpsc::channel();
        let repaint = ctx.clone();
        thread::spawn(move || {
            for (id, path) in jobs {
                match decode_avatar(&path) {
                    Ok(image) => {
                        if tx.send((id, image)).is_err() {
                            return;
                        }
                        repaint.request_repaint();
                    }
                    Err(error) => {
                        warn!(path = %path.display(), %error, "cached avatar could not be decoded");
                    }
                }
            }
        });

        Self {
            rx: Some(rx),
            loaded: HashMap::new(),
            expected,
        }
    }

    pub(super) fn poll(&mut self, ctx: &Context) {
        let Some(rx) = self.rx.take() else {
            return;
        };

        loop {
            match rx.try_recv() {
                Ok((id, image)) => {
                    let handle = ctx.load_texture(format!("avatar-{id}"), image, TextureOptions::LINEAR);
                    self.loaded.insert(id, handle);
                }
                Err(TryRecvError::Empty) => {
                    self.rx = Some(rx);
                    return;
                }
                Err(TryRecvError::Disconnected) => return,
            }
        }
    }

    pub(super) fn get(&self, id: &str) -> Option<&TextureHandle> {
        self.loaded.get(id)
    }

    pub(super) fn progress(&self) -> (usize, usize) {
        (self.loaded.len(), self.expected)
    }

    pub(super) fn is_loading(&self) -> bool {
        self.rx.is_some()
    }
}
