use nalgebra::Vector3;
use rppal::i2c::I2c;

use crate::i2c::I2CBit;
use crate::sensors::mag::registry;

/// Pilote du magnétomètre 3 axes HMC8553L (bus I2C)
pub(crate) struct HMC8553L;

impl HMC8553L {
    /// Constructeur
    pub(crate) fn new(i2c: &mut I2c) -> anyhow::Result<Self> {
        let mag = Self;

        // Prépare le module à être utilisé
        mag.set_slave(i2c)?;
        mag.init_module(i2c)?;

        Ok(mag)
    }

    fn set_slave(&self, i2c: &mut I2c) -> anyhow::Result<()> {
        i2c.set_slave_address(registry::HMC8553L_MAG_ADDR)?;
        Ok(())
    }

    /// Initialise rapidement le module avec des valeurs pré-défini
    fn init_module(&self, i2c: &mut I2c) -> anyhow::Result<()> {
        println!("[HMC8553L] Initialisation (CONF A) ...");
        i2c.ecriture_word(registry::HMC8553L_CONF_A, 0x10)?;

        println!("[HMC8553L] Initialisation (CONF B) ...");
        i2c.ecriture_word(registry::HMC8553L_CONF_B, 0x20)?;

        // Activation de la mesure continue
        println!("[HMC8553L] Initialisation (MODE) ...");
        i2c.ecriture_word(registry::HMC8553L_MODE, 0x00)?;

        println!("[HMC8553L] Fin d'initialisation.");

        Ok(())
    }

    /// Récupére la valeur en X (RAW)
    fn mag_x_raw(&self, i2c: &mut I2c) -> anyhow::Result<i16> {
        let mag_x_h = i2c.lecture_word(registry::HMC8553L_X_H)?;
        let mag_x_l = i2c.lecture_word(registry::HMC8553L_X_L)?;
        Ok(((mag_x_h as i16) << 8) | mag_x_l as i16)
    }

    /// Récupére la valeur en Y
    fn mag_y_raw(&self, i2c: &mut I2c) -> anyhow::Result<i16> {
        let mag_y_h = i2c.lecture_word(registry::HMC8553L_Y_H)?;
        let mag_y_l = i2c.lecture_word(registry::HMC8553L_Y_L)?;
        Ok(((mag_y_h as i16) << 8) | mag_y_l as i16)
    }

    /// Récupére la valeur en Z
    fn mag_z_raw(&self, i2c: &mut I2c) -> anyhow::Result<i16> {
        let mag_z_h = i2c.lecture_word(registry::HMC8553L_Z_H)?;
        let mag_z_l = i2c.lecture_word(registry::HMC8553L_Z_L)?;
        Ok(((mag_z_h as i16) << 8) | mag_z_l as i16)
    }

    /// Récupére les trois axes bruts
    pub(crate) fn axes_raw(&self, i2c: &mut I2c) -> anyhow::Result<Vector3<i16>> {
        // Défini mon capteur sur le bus I2C
        self.set_slave(i2c)?;

        let raw_x = self.mag_x_raw(i2c)?;
        let raw_y = self.mag_y_raw(i2c)?;
        let raw_z = self.mag_z_raw(i2c)?;

        Ok(Vector3::new(raw_x, raw_y, raw_z))
    }
}
